/// Quickstart example - the simplest possible usage
use quarry::{FieldPath, FlattenOptions, Flattener, FrameSpec, QueryModel, SelectionSet};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    println!("=== Quarry Quick Start ===\n");

    // Step 1: A GraphQL response body (already fetched and decoded)
    let data = json!({
        "launches": [
            {
                "mission_name": "FalconSat",
                "launch_site": {"site_name_long": "Omelek Island"},
                "rocket": {"rocket_name": "Falcon 1"}
            },
            {
                "mission_name": "CRS-20",
                "launch_site": {"site_name_long": "Cape Canaveral"},
                "rocket": {"rocket_name": "Falcon 9"}
            }
        ],
        "capsules": [
            {"serial": "C101", "missions": [{"name": "SpX-10"}]},
            {"serial": "C102", "missions": [{"name": "SpX-11"}, {"name": "SpX-12"}]}
        ]
    });

    println!("Response data:");
    println!("{}\n", serde_json::to_string_pretty(&data)?);

    // Step 2: The query model an external compiler would hand over -
    // two frames, each with its own selection set
    let model = QueryModel::with_frames(
        [
            FrameSpec {
                name: "launches".to_string(),
                root: FieldPath::new(["launches"]),
                selection: SelectionSet::from_dotted(
                    ["mission_name", "launch_site.site_name_long", "rocket.rocket_name"],
                    ".",
                ),
            },
            FrameSpec {
                name: "capsules".to_string(),
                root: FieldPath::new(["capsules"]),
                selection: SelectionSet::from_dotted(["serial", "missions.name"], "."),
            },
        ],
        SelectionSet::default(),
    );

    // Step 3: Flatten
    let tables = Flattener::new(FlattenOptions::new()).flatten(&data, &model)?;

    // Step 4: Look at what we got
    for table in &tables {
        println!("Frame '{}': {} rows", table.name, table.rows.len());
        for row in &table.rows {
            println!("  {}", serde_json::to_string(row)?);
        }
        println!();
    }

    // The capsules frame has 3 rows, not 2: each mission multiplies
    // its capsule's row.
    assert_eq!(tables[1].rows.len(), 3);

    println!("✓ Done!");
    Ok(())
}
