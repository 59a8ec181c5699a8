use ringmap_core::bounds::load_json;
use ringmap_core::{FeatureSpec, GenomeMap, LabelMode, MapConfig, Strand};
use ringmap_svg::{ExportConfig, VectorExporter};

fn demo_map() -> GenomeMap {
    let mut map = GenomeMap::new(7000, MapConfig::default()).unwrap().with_title("Determinism Test");
    let features = [
        (Strand::Direct, 1, 6899, 10, "ori"),
        (Strand::Direct, 1, 100, 900, "repA"),
        (Strand::Reverse, 1, 1200, 2500, "bla"),
        (Strand::Reverse, 2, 3000, 3050, "lacO"),
        (Strand::Direct, 2, 4000, 6000, "kan"),
    ];
    for (strand, slot, start, stop, label) in features {
        let mut spec = FeatureSpec::new(strand, slot, start, stop);
        spec.label = Some(label.to_string());
        spec.mouseover = Some(format!("{} {}..{}", label, start, stop));
        if label == "lacO" {
            spec.label_mode = LabelMode::Forced;
        }
        map.add_feature(spec).unwrap();
    }
    map
}

#[test]
fn svg_export_is_deterministic() {
    let exporter = VectorExporter::new(ExportConfig { timestamp: false, ..Default::default() });

    let dir = tempfile::tempdir().unwrap();
    let f1 = dir.path().join("a.svg");
    let f2 = dir.path().join("b.svg");

    exporter.export_svg(&f1, &mut demo_map()).unwrap();
    exporter.export_svg(&f2, &mut demo_map()).unwrap();

    let b1 = std::fs::read(&f1).unwrap();
    let b2 = std::fs::read(&f2).unwrap();
    assert_eq!(b1, b2, "SVG bytes differ between identical renders");
}

#[test]
fn bounds_sidecar_lists_mouseover_labels() {
    let exporter = VectorExporter::new(ExportConfig { timestamp: false, ..Default::default() });
    let dir = tempfile::tempdir().unwrap();
    let svg = dir.path().join("map.svg");
    let json = dir.path().join("map.json");

    let output = exporter.export_svg(&svg, &mut demo_map()).unwrap();
    exporter.export_bounds_json(&json, &output).unwrap();

    let records = load_json(&json).unwrap();
    assert_eq!(records, output.label_bounds);
    let lac = records.iter().find(|r| r.label == "lacO").expect("forced label recorded");
    assert_eq!(lac.mouseover.as_deref(), Some("lacO 3000..3050"));
}
