use std::fs;

use anyhow::Result;
use image::{GrayImage, Luma};
use pretty_assertions::assert_eq;

use ocrtable::assembly::{band_tolerance, cluster_boundaries};
use ocrtable::core::geometry::{BBox, Quad};
use ocrtable::core::model::{Cell, Detection, RowKind};
use ocrtable::core::strategy::StrategyKind;
use ocrtable::export::{import_csv, CsvExporter, Exporter};
use ocrtable::grid::{GridProbe, MorphologyGridDetector};
use ocrtable::ocr::detections::parse_detections;
use ocrtable::ocr::SourceImage;
use ocrtable::pipeline::{
    export_table, extract_column, extract_columns, extract_table, finalize, ColumnInput,
    ExportFormat,
};
use ocrtable::{find_best_sequential_match, sequential_character_match, ReferenceSet, TableConfig};

fn det(text: &str, x0: f32, y0: f32, x1: f32, y1: f32, confidence: f32) -> Detection {
    Detection::new(Quad::from_bbox(BBox::new(x0, y0, x1, y1)), text, confidence)
}

fn ruled_column(width: u32, height: u32, rules: &[u32]) -> GrayImage {
    let mut img = GrayImage::from_pixel(width, height, Luma([255]));
    for &y in rules {
        for x in 5..width - 5 {
            img.put_pixel(x, y, Luma([0]));
            img.put_pixel(x, y + 1, Luma([0]));
        }
    }
    img
}

fn ruled_grid(size: u32, rules: &[u32]) -> GrayImage {
    let mut img = GrayImage::from_pixel(size, size, Luma([255]));
    let (lo, hi) = (rules[0], rules[rules.len() - 1] + 2);
    for &r in rules {
        for t in lo..hi {
            for d in 0..2 {
                img.put_pixel(t, r + d, Luma([0]));
                img.put_pixel(r + d, t, Luma([0]));
            }
        }
    }
    img
}

#[test]
fn plain_list_without_rules_uses_simple_mode() {
    let dets = vec![
        det("ACME-01", 0.0, 40.0, 80.0, 50.0, 0.9),
        det("100", 0.0, 10.0, 40.0, 20.0, 0.97),
    ];
    let config = TableConfig::default();
    let image = SourceImage::from_gray(GrayImage::from_pixel(200, 100, Luma([255])), 1024);
    let detector = MorphologyGridDetector::default();

    let out = extract_column(
        &dets,
        Some(&image),
        &detector,
        config.column("Description").unwrap(),
        &config.grid,
    );
    assert_eq!(out.strategy, StrategyKind::Simple);
    assert_eq!(
        out.cells,
        vec![Cell::ocr("100", 0.97), Cell::ocr("ACME-01", 0.9)]
    );
}

#[test]
fn ruled_column_merges_wrapped_descriptions() {
    let image = SourceImage::from_gray(ruled_column(400, 300, &[50, 150, 250]), 1024);
    let detector = MorphologyGridDetector::default();
    let lines = detector.horizontal_lines(&image);
    assert!(!lines.is_empty());

    let dets = vec![
        det("HEX", 10.0, 60.0, 60.0, 80.0, 0.99),
        det("BOLT M8", 70.0, 60.0, 160.0, 80.0, 0.97),
        det("ZINC PLATED", 10.0, 95.0, 150.0, 115.0, 0.83),
        det("WASHER", 10.0, 170.0, 90.0, 190.0, 0.96),
    ];
    let config = TableConfig::default();
    let out = extract_column(
        &dets,
        Some(&image),
        &detector,
        config.column("Description").unwrap(),
        &config.grid,
    );
    assert_eq!(out.strategy, StrategyKind::Banded);
    assert_eq!(
        out.cells,
        vec![
            Cell::ocr("HEX BOLT M8 ZINC PLATED", 0.83),
            Cell::ocr("WASHER", 0.96),
        ]
    );
}

#[test]
fn each_rule_becomes_one_boundary() {
    let rules = [50u32, 150, 250];
    let image = SourceImage::from_gray(ruled_column(400, 300, &rules), 1024);
    let detector = MorphologyGridDetector::default();
    let dets = vec![
        det("HEX", 10.0, 60.0, 60.0, 80.0, 0.99),
        det("WASHER", 10.0, 170.0, 90.0, 190.0, 0.96),
    ];

    let lines = detector.horizontal_lines(&image);
    assert!(lines.len() >= rules.len(), "{lines:?}");
    let bounds = cluster_boundaries(&lines, band_tolerance(&dets, 20.0));

    assert_eq!(bounds.len(), rules.len(), "{bounds:?}");
    for (bound, rule) in bounds.iter().zip(rules) {
        assert!((bound - rule as i32).abs() <= 2, "{bound} vs rule {rule}");
    }
}

#[test]
fn ruled_table_fills_cells_by_rectangle() {
    let image = SourceImage::from_gray(ruled_grid(200, &[10, 100, 190]), 1024);
    let dets = vec![
        det("AB-123", 20.0, 40.0, 80.0, 60.0, 0.98),
        det("4", 130.0, 40.0, 150.0, 60.0, 0.99),
        det("AB-124", 20.0, 130.0, 80.0, 150.0, 0.96),
    ];
    let mut config = TableConfig::default();
    config.columns.truncate(2);

    let detector = MorphologyGridDetector::new(config.grid.clone());
    let mut session = extract_table(&dets, &image, &detector, &config);
    let refs = ReferenceSet::new(vec!["AB-123".to_string(), "AB-124".to_string()]);
    let table = finalize(&mut session, &refs).unwrap();

    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].text(0), "AB-123");
    assert_eq!(table.rows[0].text(1), "4");
    assert_eq!(table.rows[1].text(0), "AB-124");
    assert_eq!(table.rows[1].cells[1], Cell::empty());
    assert!(table
        .rows
        .iter()
        .all(|r| r.classification.as_ref().map(|c| c.kind) == Some(RowKind::Linked)));
}

#[test]
fn matcher_scenarios() {
    let report = find_best_sequential_match("AB-123", &["AB-123", "AB-124", "ZZ-999"]);
    assert_eq!(report.best_match.target, "AB-123");
    assert_eq!(report.best_match.rating, 1.0);

    let empty: [&str; 0] = [];
    let report = find_best_sequential_match("AB-123", &empty);
    assert_eq!(report.best_match.target, "");
    assert_eq!(report.best_match.rating, 0.0);

    for s in ["", "ab-1", "  Zz 9 "] {
        assert_eq!(sequential_character_match(s, s), 1.0);
    }
    assert!(sequential_character_match("B-12", "XAB-123") >= 0.99);

    let mut candidate = String::from("AB123");
    let mut last = sequential_character_match("AB-1", &candidate);
    for _ in 0..6 {
        candidate.push('Q');
        let score = sequential_character_match("AB-1", &candidate);
        assert!(score <= last, "{candidate}: {score} > {last}");
        last = score;
    }
}

#[test]
fn end_to_end_columns_to_csv_round_trip() -> Result<()> {
    let raw_ids = r#"[
        {"box": [[0,10],[80,10],[80,30],[0,30]], "text": "AB-123", "confidence": 0.99},
        {"box": [[0,50],[80,50],[80,70],[0,70]], "text": "AB12E", "confidence": 0.88}
    ]"#;
    let raw_qty = r#"[[
        [[[0,12],[20,12],[20,28],[0,28]], ["2", 0.99]],
        [[[0,52],[20,52],[20,68],[0,68]], ["10", 0.9]]
    ]]"#;
    let inputs = vec![
        ColumnInput {
            name: "Part Number".to_string(),
            detections: parse_detections(raw_ids)?,
            image: None,
        },
        ColumnInput {
            name: "Quantity".to_string(),
            detections: parse_detections(raw_qty)?,
            image: None,
        },
    ];
    let config = TableConfig::default();
    let detector = MorphologyGridDetector::new(config.grid.clone());
    let mut session = extract_columns(&inputs, &detector, &config)?;
    let refs = ReferenceSet::from_lookup_json(
        r#"{"rows":[{"drawingNumber":"AB-123"},{"drawingNumber":"AB%2D124"}]}"#,
    )?;
    let table = finalize(&mut session, &refs)?;

    let second = table.rows[1].classification.clone().unwrap();
    assert_eq!(second.kind, RowKind::Unlinked);
    assert_eq!(second.matched_reference, "AB12E");
    assert!(second.needs_review);
    assert!(table.rows[1].warning.contains("Caution in Quantity value"));

    let dir = tempfile::tempdir()?;
    CsvExporter::new(dir.path().to_path_buf()).export(&table)?;
    let back = import_csv(&dir.path().join("table.csv"), &table.columns)?;
    let texts = |t: &ocrtable::Table| -> Vec<Vec<String>> {
        t.rows
            .iter()
            .map(|r| r.cells.iter().map(|c| c.text.clone()).collect())
            .collect()
    };
    assert_eq!(texts(&back), texts(&table));

    export_table(&table, dir.path(), &[ExportFormat::Payload], &config)?;
    let payload: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("payload.json"))?)?;
    assert_eq!(payload["linked"][0]["reference"], "AB-123");
    assert_eq!(payload["unlinked"][0]["reference"], "AB12E");
    assert_eq!(payload["unlinked"][0]["fields"]["Quantity"], "10");
    Ok(())
}

#[test]
fn empty_input_yields_empty_table() -> Result<()> {
    let config = TableConfig::default();
    let detector = MorphologyGridDetector::default();
    let inputs = vec![ColumnInput {
        name: "Part Number".to_string(),
        detections: parse_detections("[]")?,
        image: None,
    }];
    let mut session = extract_columns(&inputs, &detector, &config)?;
    let table = finalize(&mut session, &ReferenceSet::default())?;
    assert!(table.rows.is_empty());
    Ok(())
}
