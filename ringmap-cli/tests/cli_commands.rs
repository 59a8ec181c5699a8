use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

const PUC19: &str = "#pUC19\n%2686\n\
!strand\tslot\tstart\tstop\ttype\tlabel\tmouseover\n\
forward\t1\t146\t469\tgene\tlacZ alpha\t-\n\
reverse\t1\t1626\t2486\tgene\tbla\tbeta-lactamase\n\
forward\t2\t1\t100\tpromoter\tPlac\t-\n\
reverse\t3\t867\t1455\torigin_of_replication\tori\t-\n";

fn ringmap(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ringmap"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("failed to run ringmap")
}

#[test]
fn test_render_is_deterministic() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("pUC19.tab"), PUC19).unwrap();

    for out in ["a.svg", "b.svg"] {
        let result = ringmap(dir.path(), &["render", "pUC19.tab", "-o", out, "--deterministic", "-q"]);
        assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    }
    let a = std::fs::read(dir.path().join("a.svg")).unwrap();
    let b = std::fs::read(dir.path().join("b.svg")).unwrap();
    assert_eq!(a, b);
    let text = String::from_utf8(a).unwrap();
    assert!(text.starts_with("<?xml"));
    assert!(text.contains("2686 bp"));
}

#[test]
fn test_render_directory_with_bounds() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("one.tab"), PUC19).unwrap();
    std::fs::write(dir.path().join("two.tab"), PUC19.replace("#pUC19", "#copy")).unwrap();

    let result = ringmap(
        dir.path(),
        &["render", "one.tab", "two.tab", "-o", "maps", "--bounds-json", "--width", "1200", "--height", "1200", "-q"],
    );
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    for name in ["one", "two"] {
        let svg = std::fs::read_to_string(dir.path().join("maps").join(format!("{}.svg", name))).unwrap();
        assert!(svg.contains(r#"width="1200""#));
        let bounds = std::fs::read_to_string(dir.path().join("maps").join(format!("{}.bounds.json", name))).unwrap();
        assert!(bounds.contains("beta-lactamase"));
    }
}

#[test]
fn test_config_file_is_picked_up() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("pUC19.tab"), PUC19).unwrap();
    std::fs::write(dir.path().join("ringmap.toml"), "[map]\nwidth = 700\nheight = 700\n").unwrap();

    let result = ringmap(dir.path(), &["render", "pUC19.tab", "-o", "map.svg", "--deterministic", "-q"]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    let svg = std::fs::read_to_string(dir.path().join("map.svg")).unwrap();
    assert!(svg.contains(r#"width="700""#));

    let shown = ringmap(dir.path(), &["config"]);
    assert!(String::from_utf8_lossy(&shown.stdout).contains("width = 700"));
    let example = ringmap(dir.path(), &["config", "--example"]);
    assert!(String::from_utf8_lossy(&example.stdout).contains("width = 900"));
}

#[test]
fn test_inspect_json() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("pUC19.tab"), PUC19).unwrap();

    let result = ringmap(dir.path(), &["inspect", "pUC19.tab", "--json", "-q"]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    let report: serde_json::Value = serde_json::from_slice(&result.stdout).unwrap();
    assert_eq!(report["sequence_length"], 2686);
    assert_eq!(report["features"], 4);
    assert_eq!(report["title"], "pUC19");
}

#[test]
fn test_missing_input_reports_suggestions() {
    let dir = tempdir().unwrap();
    let result = ringmap(dir.path(), &["render", "absent.tab", "-o", "absent.svg", "-q"]);
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("File not found"));
    assert!(stderr.contains("Suggestions:"));
}

const PO157: &str = "Escherichia coli O157:H7 plasmid pO157, complete sequence - 1..92721\n\
2 proteins\n\
Location\tStrand\tLength\tPID\tGene\tSynonym\tCode\tCOG\tProduct\n\
190..1101\t+\t303\t10955266\trepA\tECO57p01\tL\tCOG5527L\treplication protein\n\
2001..2400\t-\t132\t10955267\t-\tECO57p02\t-\t-\thypothetical protein\n";

#[test]
fn test_render_protein_table_with_html() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("pO157.ptt"), PO157).unwrap();

    let result = ringmap(dir.path(), &["render", "pO157.ptt", "-o", "pO157.svg", "--html", "--border", "-q"]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    let svg = std::fs::read_to_string(dir.path().join("pO157.svg")).unwrap();
    assert!(svg.contains("92,721 bp"));
    let page = std::fs::read_to_string(dir.path().join("pO157.html")).unwrap();
    assert!(page.contains(r##"usemap="#ringmap""##));
    assert!(page.contains("https://www.ncbi.nlm.nih.gov/protein/10955266"));
}
