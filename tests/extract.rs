use std::fs;
use std::path::Path;

use fleet_arrears::ExtractError;
use fleet_arrears::extract::{
    ExtractOptions, SheetStatus, extract_workbook, extract_workbook_detailed,
};
use fleet_arrears::fields::FieldDictionary;
use fleet_arrears::io::WorkbookSource;
use fleet_arrears::io::excel_read::CalamineWorkbook;
use fleet_arrears::io::memory::MemoryWorkbook;
use fleet_arrears::model::{FieldKey, OutputRow};
use fleet_arrears::pipeline::{self, OutputFormat};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use tempfile::tempdir;

#[derive(Clone, Copy)]
enum Cell {
    Empty,
    Text(&'static str),
    Number(f64),
    Date(u16, u8, u8),
}

use Cell::{Date, Empty, Number, Text};

struct Sheet {
    name: &'static str,
    first_row: u32,
    rows: Vec<Vec<Cell>>,
}

fn write_fixture(path: &Path, sheets: &[Sheet]) {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name).expect("sheet named");
        for (offset, row) in sheet.rows.iter().enumerate() {
            let row_idx = sheet.first_row + offset as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                match *cell {
                    Empty => {}
                    Text(value) => {
                        worksheet
                            .write_string(row_idx, col_idx as u16, value)
                            .expect("string written");
                    }
                    Number(value) => {
                        worksheet
                            .write_number(row_idx, col_idx as u16, value)
                            .expect("number written");
                    }
                    Date(year, month, day) => {
                        let date = ExcelDateTime::from_ymd(year, month, day).expect("valid date");
                        worksheet
                            .write_datetime_with_format(
                                row_idx,
                                col_idx as u16,
                                &date,
                                &date_format,
                            )
                            .expect("date written");
                    }
                }
            }
        }
    }
    workbook.save(path).expect("fixture saved");
}

fn jakarta_sheet() -> Sheet {
    Sheet {
        name: "Jakarta",
        first_row: 0,
        rows: vec![
            vec![Text("Laporan Tunggakan Unit")],
            vec![Text("Plate"), Text("Unit"), Text("Saldo")],
            vec![Text("B 1234 XYZ"), Text("Avanza"), Text("1500,4")],
            vec![Empty, Text("Xenia"), Number(900.0)],
            vec![Text("D 5678 AB"), Text("Brio"), Number(1500.6)],
            vec![Text("F 9 GH"), Text("Jazz"), Text("lunas")],
        ],
    }
}

fn jabar_sheet() -> Sheet {
    Sheet {
        name: "Jabar",
        first_row: 3,
        rows: vec![
            vec![
                Text("No"),
                Text("No Polisi"),
                Text("Leasing"),
                Text("OVD"),
                Text("Cabang"),
                Text("Keterangan"),
                Text("No Rangka"),
                Text("No Mesin"),
            ],
            vec![
                Number(1.0),
                Text("  T 4455 KL "),
                Text("Adira"),
                Number(45.0),
                Text("Karawang"),
                Text("tarik"),
                Text("MHKA1BA1J0K012345"),
                Text("1NR1234567"),
            ],
            vec![Number(2.0), Text("Z 1 Q"), Text("BAF"), Number(12.0)],
            vec![Number(3.0)],
            vec![
                Number(4.0),
                Text("E 77 RT"),
                Text("WOM"),
                Number(90.0),
                Text("Cirebon"),
            ],
        ],
    }
}

fn summary_sheet() -> Sheet {
    Sheet {
        name: "Ringkasan",
        first_row: 0,
        rows: vec![
            vec![Text("Nopol"), Text("Saldo")],
            vec![Text("B 1 A"), Number(10.0)],
        ],
    }
}

fn plates(rows: &[OutputRow]) -> Vec<&str> {
    rows.iter().map(|row| row.get(FieldKey::Plate)).collect()
}

#[test]
fn workbook_sheets_are_extracted_in_order() {
    let dir = tempdir().expect("temporary directory");
    let path = dir.path().join("collections.xlsx");
    write_fixture(&path, &[summary_sheet(), jakarta_sheet(), jabar_sheet()]);

    let mut workbook = CalamineWorkbook::open(&path).expect("workbook opened");
    let extraction = extract_workbook_detailed(
        &mut workbook,
        FieldDictionary::standard(),
        ExtractOptions::default(),
    );

    assert_eq!(
        plates(&extraction.rows),
        ["B1234XYZ", "D5678AB", "F9GH", "T4455KL", "Z1Q", "E77RT"]
    );
    assert!(extraction.rows.iter().all(|row| row.values().len() == 9));

    let jakarta = &extraction.rows[..3];
    assert_eq!(jakarta[0].get(FieldKey::Balance), "1500");
    assert_eq!(jakarta[1].get(FieldKey::Balance), "1501");
    assert_eq!(jakarta[2].get(FieldKey::Balance), "lunas");
    assert_eq!(jakarta[0].get(FieldKey::VehicleType), "Avanza");

    let full = &extraction.rows[3];
    assert_eq!(
        full.values(),
        [
            "T4455KL",
            "",
            "Adira",
            "45",
            "",
            "Karawang",
            "tarik",
            "MHKA1BA1J0K012345",
            "1NR1234567"
        ]
    );
    let short = &extraction.rows[4];
    assert_eq!(short.get(FieldKey::DaysOverdue), "12");
    assert_eq!(short.get(FieldKey::Branch), "");

    assert_eq!(extraction.sheets.len(), 3);
    assert_eq!(extraction.sheets[0].status, SheetStatus::TooSmall { rows: 2 });
    assert_eq!(
        extraction.sheets[1].status,
        SheetStatus::Extracted {
            header_row: 1,
            records: 3
        }
    );
    // Blank rows above the used range still count towards the row index.
    assert_eq!(
        extraction.sheets[2].status,
        SheetStatus::Extracted {
            header_row: 3,
            records: 3
        }
    );
}

#[test]
fn header_below_the_window_is_never_found() {
    let dir = tempdir().expect("temporary directory");
    let path = dir.path().join("late.xlsx");
    let rows = vec![
        vec![Text("Nopol"), Text("Saldo")],
        vec![Text("B 1 A"), Number(1.0)],
        vec![Text("B 2 A"), Number(2.0)],
        vec![Text("B 3 A"), Number(3.0)],
        vec![Text("B 4 A"), Number(4.0)],
    ];
    write_fixture(
        &path,
        &[
            Sheet {
                name: "Inside",
                first_row: 9,
                rows: rows.clone(),
            },
            Sheet {
                name: "Outside",
                first_row: 10,
                rows,
            },
        ],
    );

    let mut workbook = CalamineWorkbook::open(&path).expect("workbook opened");
    let extraction = extract_workbook_detailed(
        &mut workbook,
        FieldDictionary::standard(),
        ExtractOptions::default(),
    );
    assert_eq!(plates(&extraction.rows), ["B1A", "B2A", "B3A", "B4A"]);
    assert_eq!(extraction.sheets[1].status, SheetStatus::NoHeader);
}

#[test]
fn streamed_and_materialized_workbooks_match() {
    let dir = tempdir().expect("temporary directory");
    let path = dir.path().join("collections.xlsx");
    write_fixture(&path, &[jakarta_sheet(), jabar_sheet()]);

    let mut streamed = CalamineWorkbook::open(&path).expect("workbook opened");
    let mut materialized = MemoryWorkbook::new();
    for sheet in streamed.sheet_names() {
        let rows: Vec<Vec<String>> = streamed.rows(&sheet).expect("sheet rows").collect();
        materialized = materialized.with_sheet(sheet, rows);
    }

    let dictionary = FieldDictionary::standard();
    let options = ExtractOptions::default();
    let from_stream = extract_workbook(&mut streamed, dictionary, options);
    let from_memory = extract_workbook(&mut materialized, dictionary, options);

    assert!(!from_stream.is_empty());
    assert_eq!(
        serde_json::to_vec(&from_stream).expect("json"),
        serde_json::to_vec(&from_memory).expect("json")
    );
}

#[test]
fn staged_copy_is_removed_after_extraction() {
    let dir = tempdir().expect("temporary directory");
    let input = dir.path().join("collections.xlsx");
    write_fixture(&input, &[jakarta_sheet()]);
    let staging = dir.path().join("staging");

    let extraction =
        pipeline::extract_copy(&input, None, &staging, ExtractOptions::default())
            .expect("extraction succeeded");
    assert_eq!(extraction.rows.len(), 3);
    assert_eq!(fs::read_dir(&staging).expect("staging listing").count(), 0);
}

#[test]
fn upload_without_records_reports_no_data() {
    let dir = tempdir().expect("temporary directory");
    let input = dir.path().join("notes.xlsx");
    write_fixture(
        &input,
        &[Sheet {
            name: "Notes",
            first_row: 0,
            rows: (0..8).map(|_| vec![Text("meeting notes")]).collect(),
        }],
    );

    let bytes = fs::read(&input).expect("fixture bytes");
    let extraction = pipeline::extract_upload(
        &mut bytes.as_slice(),
        "xlsx",
        &dir.path().join("staging"),
        ExtractOptions::default(),
    )
    .expect("workbook readable");
    assert_eq!(extraction.sheets[0].status, SheetStatus::NoHeader);

    let error = pipeline::require_records(extraction).expect_err("empty result rejected");
    assert!(matches!(error, ExtractError::NoData));
    assert!(error.is_client_error());
}

#[test]
fn records_export_to_json_and_xlsx() {
    let dir = tempdir().expect("temporary directory");
    let input = dir.path().join("collections.xlsx");
    write_fixture(&input, &[jakarta_sheet()]);
    let mut rows = pipeline::require_records(
        pipeline::extract_file(&input, ExtractOptions::default()).expect("extracted"),
    )
    .expect("records present");
    rows.push(OutputRow::from(
        ["B1", "Avanza", "Adira", "45", "100", "Bogor", "tarik", "MHK1", "1NR1"].map(String::from),
    ));

    let json_path = dir.path().join("records.json");
    pipeline::write_records(&json_path, &rows, OutputFormat::Json { pretty: true })
        .expect("json written");
    let parsed: Vec<OutputRow> =
        serde_json::from_str(&fs::read_to_string(&json_path).expect("json read"))
            .expect("json parsed");
    assert_eq!(parsed, rows);

    let xlsx_path = dir.path().join("records.xlsx");
    pipeline::write_records(&xlsx_path, &rows, OutputFormat::Xlsx).expect("xlsx written");
    let mut exported = CalamineWorkbook::open(&xlsx_path).expect("export opened");
    let reread = extract_workbook(
        &mut exported,
        FieldDictionary::standard(),
        ExtractOptions::default(),
    );
    assert_eq!(reread, rows);
}

#[test]
fn date_cells_arrive_as_calendar_text() {
    let dir = tempdir().expect("temporary directory");
    let path = dir.path().join("dated.xlsx");
    let mut rows = vec![vec![Text("Nopol"), Text("Keterangan")]];
    rows.extend((0..4).map(|_| vec![Text("B 1 A"), Date(2024, 10, 15)]));
    write_fixture(
        &path,
        &[Sheet {
            name: "Tarikan",
            first_row: 0,
            rows,
        }],
    );

    let mut workbook = CalamineWorkbook::open(&path).expect("workbook opened");
    let records = extract_workbook(
        &mut workbook,
        FieldDictionary::standard(),
        ExtractOptions::default(),
    );
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|row| row.get(FieldKey::Remarks) == "2024-10-15"));
}
