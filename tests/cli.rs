use std::path::Path;
use std::process::{Command, Output};

fn care(store: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_care"))
        .args(args)
        .env("CARGO_CARE_DIR", store)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run care")
}

fn ok(store: &Path, args: &[&str]) -> String {
    let output = care(store, args);
    if !output.status.success() {
        panic!(
            "care {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn plans_get_sequenced_references_and_equipment_codes() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join(".cargo-care");

    assert_eq!(ok(&store, &["init"]), format!("Initialized {}", store.display()));
    ok(&store, &["branch", "add", "ho", "Head Office"]);

    let first = ok(&store, &["plan", "create", "--branch", "HO", "--year", "2024"]);
    assert_eq!(first, "Created HO20240001 (Head Office)");
    let second = ok(
        &store,
        &["--json", "plan", "create", "-b", "ho", "-y", "2024", "--carrier", "MSC"],
    );
    let second: serde_json::Value = serde_json::from_str(&second).unwrap();
    assert_eq!(second["reference"], "HO20240002");

    let added = ok(
        &store,
        &["equip", "add", "HO20240001", "20ft Standard Container", "-q", "2"],
    );
    assert_eq!(added, "Added 20SC x2 to HO20240001");
    let added = ok(&store, &["equip", "add", "HO20240001", "20ft Standard Container"]);
    assert_eq!(added, "Added 20STCO x1 to HO20240001");

    let shown = ok(&store, &["--json", "plan", "show", "HO20240001"]);
    let shown: serde_json::Value = serde_json::from_str(&shown).unwrap();
    assert_eq!(shown["equipment"].as_array().unwrap().len(), 2);
}

#[test]
fn unknown_branch_is_a_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join(".cargo-care");
    ok(&store, &["init"]);

    let output = care(&store, &["plan", "create", "--branch", "XX"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown business branch 'XX'"));
    assert_eq!(ok(&store, &["plan", "list"]), "No plans found.");
}

#[test]
fn master_data_overrides_generated_code() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join(".cargo-care");
    ok(&store, &["init"]);

    assert_eq!(ok(&store, &["code", "20ft Standard Container"]), "20SC");
    ok(&store, &["master", "add", "20ft Standard Container", "20gp"]);
    assert_eq!(
        ok(&store, &["code", "20FT standard container", "--existing", "20GP"]),
        "20GP"
    );
    assert_eq!(ok(&store, &["code", ""]), "EQP");
}

#[test]
fn export_and_import_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join(".cargo-care");
    let csv_path = dir.path().join("plans.csv");
    let csv_path = csv_path.to_str().unwrap();

    ok(&store, &["init"]);
    ok(&store, &["branch", "add", "HO", "Head Office"]);
    ok(&store, &["plan", "create", "-b", "HO", "-y", "2024", "--origin", "Dhaka"]);
    ok(&store, &["equip", "add", "HO2024", "40' High Cube Container"]);
    ok(&store, &["equip", "add", "HO2024", "Flat Rack", "-q", "4"]);
    ok(&store, &["export", "--output", csv_path]);

    ok(&store, &["plan", "delete", "HO20240001", "--force"]);
    assert_eq!(ok(&store, &["plan", "list"]), "No plans found.");

    let imported = ok(&store, &["--json", "import", csv_path]);
    let imported: serde_json::Value = serde_json::from_str(&imported).unwrap();
    assert_eq!(imported["imported"], serde_json::json!(["HO20240001"]));

    let shown = ok(&store, &["--json", "plan", "show", "HO20240001"]);
    let shown: serde_json::Value = serde_json::from_str(&shown).unwrap();
    assert_eq!(shown["origin"], "Dhaka");
    assert_eq!(shown["equipment"][0]["code"], "40HCC");
    assert_eq!(shown["equipment"][1]["code"], "FRX");
    assert_eq!(shown["equipment"][1]["quantity"], 4);

    // importing again skips what already exists
    let again = care(&store, &["--json", "import", csv_path]);
    assert!(again.status.success());
    let again: serde_json::Value = serde_json::from_slice(&again.stdout).unwrap();
    assert_eq!(again["skipped"], serde_json::json!(["HO20240001"]));
}

#[test]
fn warnings_on_a_pipe_are_plain_text() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join(".cargo-care");
    let csv_path = dir.path().join("plans.csv");
    std::fs::write(&csv_path, "reference,branch,year\nHO20240001,HO,2024\n").unwrap();

    ok(&store, &["init"]);
    ok(&store, &["branch", "add", "HO", "Head Office"]);
    ok(&store, &["import", csv_path.to_str().unwrap()]);

    let again = care(&store, &["import", csv_path.to_str().unwrap()]);
    assert!(again.status.success());
    let stderr = String::from_utf8_lossy(&again.stderr);
    assert!(stderr.contains("plan already exists, skipping"));
    assert!(!stderr.contains("\x1b["), "escape codes in {:?}", stderr);
}

#[test]
fn import_without_references_sequences_new_plans() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join(".cargo-care");
    let csv_path = dir.path().join("bulk.csv");
    std::fs::write(
        &csv_path,
        "branch,year,carrier,equipment_type,quantity\n\
         HO,2025,MSC,20ft Standard Container,2\n\
         HO,2025,MSC,20ft Standard Container,1\n\
         HO,2025,CMA,Open Top,\n",
    )
    .unwrap();

    ok(&store, &["init"]);
    ok(&store, &["branch", "add", "HO", "Head Office"]);
    ok(&store, &["plan", "create", "-b", "HO", "-y", "2025"]);

    let imported = ok(&store, &["--json", "import", csv_path.to_str().unwrap()]);
    let imported: serde_json::Value = serde_json::from_str(&imported).unwrap();
    assert_eq!(
        imported["imported"],
        serde_json::json!(["HO20250002", "HO20250003"])
    );

    let shown = ok(&store, &["--json", "plan", "show", "HO20250002"]);
    let shown: serde_json::Value = serde_json::from_str(&shown).unwrap();
    assert_eq!(shown["equipment"][0]["code"], "20SC");
    assert_eq!(shown["equipment"][1]["code"], "20STCO");
}

#[test]
fn given_references_are_kept_when_mixed_with_new_rows() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join(".cargo-care");
    let csv_path = dir.path().join("mixed.csv");
    std::fs::write(
        &csv_path,
        "reference,branch,year,carrier\n\
         ,HO,2024,MSC\n\
         HO20240001,HO,2024,CMA\n",
    )
    .unwrap();

    ok(&store, &["init"]);
    ok(&store, &["branch", "add", "HO", "Head Office"]);

    let imported = ok(&store, &["--json", "import", csv_path.to_str().unwrap()]);
    let imported: serde_json::Value = serde_json::from_str(&imported).unwrap();
    assert_eq!(
        imported["imported"],
        serde_json::json!(["HO20240001", "HO20240002"])
    );
    assert_eq!(imported["skipped"], serde_json::json!([]));

    let first = ok(&store, &["--json", "plan", "show", "HO20240001"]);
    let first: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(first["carrier"], "CMA");
    let second = ok(&store, &["--json", "plan", "show", "HO20240002"]);
    let second: serde_json::Value = serde_json::from_str(&second).unwrap();
    assert_eq!(second["carrier"], "MSC");
}

#[test]
fn import_writes_nothing_when_a_later_row_is_bad() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join(".cargo-care");
    ok(&store, &["init"]);
    ok(&store, &["branch", "add", "HO", "Head Office"]);

    let cases = [
        ("bad_reference.csv", "HO20240001,HO,2024\nHO2023XYZ,HO,2023\n", "HO2023XYZ"),
        ("padded.csv", ",HO,2024\nHO202400001,HO,2024\n", "HO202400001"),
        ("year_mismatch.csv", ",HO,2024\nHO20230001,HO,2024\n", "does not match year"),
        ("year_range.csv", ",HO,2024\n,HO,12345\n", "out of range"),
    ];
    for (name, rows, expected) in cases {
        let csv_path = dir.path().join(name);
        std::fs::write(&csv_path, format!("reference,branch,year\n{}", rows)).unwrap();

        let output = care(&store, &["import", csv_path.to_str().unwrap()]);
        assert!(!output.status.success(), "{} imported", name);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Line 3"), "{}: {}", name, stderr);
        assert!(stderr.contains(expected), "{}: {}", name, stderr);
        assert_eq!(ok(&store, &["plan", "list"]), "No plans found.");
    }
}

#[test]
fn plan_year_must_have_four_digits() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join(".cargo-care");
    ok(&store, &["init"]);
    ok(&store, &["branch", "add", "HO", "Head Office"]);

    for year in ["12345", "24", "-2024"] {
        let output = care(&store, &["plan", "create", "-b", "HO", "-y", year]);
        assert!(!output.status.success(), "year {} accepted", year);
    }
    assert_eq!(ok(&store, &["plan", "list"]), "No plans found.");

    assert_eq!(
        ok(&store, &["plan", "create", "-b", "HO", "-y", "1000"]),
        "Created HO10000001 (Head Office)"
    );
}

#[test]
fn notes_are_added_to_plans() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join(".cargo-care");
    ok(&store, &["init"]);
    ok(&store, &["branch", "add", "HO", "Head Office"]);
    ok(&store, &["plan", "create", "-b", "HO", "-y", "2024"]);

    assert_eq!(
        ok(&store, &["plan", "note", "HO2024", "Booking requested"]),
        "Added note to HO20240001"
    );
    ok(&store, &["plan", "note", "HO20240001", "Reefer plugged in"]);
    assert!(!care(&store, &["plan", "note", "HO20240001", "  "]).status.success());

    let shown = ok(&store, &["--json", "plan", "show", "HO20240001"]);
    let shown: serde_json::Value = serde_json::from_str(&shown).unwrap();
    let notes: Vec<&str> = shown["notes"].as_str().unwrap().lines().collect();
    assert_eq!(notes.len(), 2);
    assert!(notes[0].starts_with('[') && notes[0].ends_with("] Booking requested"));
    assert!(notes[1].ends_with("] Reefer plugged in"));
}
