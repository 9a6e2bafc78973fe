use lineage_core::FamilyTreeDocument;
use schemars::schema_for;

fn main() {
    let schema = schema_for!(FamilyTreeDocument);
    let json = serde_json::to_string_pretty(&schema).expect("serialize json schema");
    println!("{json}");
}
