use super::defaults::{number_or_zero, text_or_dash, Cell};
use crate::records::types::TestReport;

pub const COLUMN_COUNT: usize = 43;

/// Header row, in sheet order.
pub const COLUMNS: [&str; COLUMN_COUNT] = [
    "No Tes",
    "Nama Peserta",
    "Tanggal Lahir",
    "Nama PT",
    "SDR/SDRI",
    "Jenis Kelamin",
    "Tanggal Tes",
    "PHQ",
    "Keterangan PHQ",
    "SE / Konkrit Praktis",
    "WA / Verbal",
    "AN / Fleksibilitas Pikir",
    "GE / Daya Abstraksi Verbal",
    "RA / Berpikir Praktis",
    "IQ",
    "Klasifikasi IQ",
    "WA GE",
    "N",
    "G",
    "A",
    "L",
    "P",
    "I",
    "T",
    "V",
    "S",
    "B",
    "O",
    "X",
    "C",
    "D",
    "R",
    "Z",
    "E",
    "K",
    "F",
    "W",
    "NG",
    "CDR",
    "TV",
    "PI",
    "BS",
    "ZK",
];

/// Dates in the sheet read `DD/MM/YYYY`.
pub const SHEET_DATE_FORMAT: &str = "%d/%m/%Y";

/// One data row for `report`, aligned with [`COLUMNS`].
pub fn export_row(report: &TestReport) -> Vec<Cell> {
    let info = &report.personal.info;
    let ist = report.ist.as_ref();
    let papi = report.papikostick.as_ref();

    let mut row = Vec::with_capacity(COLUMN_COUNT);
    row.push(text_or_dash(Some(&info.no_tes)));
    row.push(text_or_dash(Some(&info.nama_peserta)));
    row.push(Cell::Text(
        info.tanggal_lahir.format(SHEET_DATE_FORMAT).to_string(),
    ));
    row.push(text_or_dash(info.nama_pt.as_deref()));
    row.push(Cell::Text(info.sdr_sdri.as_str().to_string()));
    row.push(Cell::Text(info.jenis_kelamin.as_str().to_string()));
    row.push(Cell::Text(info.tanggal_tes.format(SHEET_DATE_FORMAT).to_string()));
    row.push(text_or_dash(info.phq.as_deref()));
    row.push(text_or_dash(info.keterangan_phq.as_deref()));

    row.push(number_or_zero(ist.map(|s| s.raw.se_konkrit_praktis)));
    row.push(number_or_zero(ist.map(|s| s.raw.wa_verbal)));
    row.push(number_or_zero(ist.map(|s| s.raw.an_fleksibilitas_pikir)));
    row.push(number_or_zero(ist.map(|s| s.raw.ge_daya_abstraksi_verbal)));
    row.push(number_or_zero(ist.map(|s| s.raw.ra_berpikir_praktis)));
    row.push(number_or_zero(ist.map(|s| s.iq)));
    row.push(text_or_dash(ist.and_then(|s| s.iq_classification.as_deref())));
    row.push(number_or_zero(ist.map(|s| s.wa_ge)));

    match papi {
        Some(p) => {
            row.extend(p.raw.letters().iter().map(|(_, v)| number_or_zero(Some(*v))));
            row.extend(p.composites.named().iter().map(|(_, v)| number_or_zero(Some(*v))));
        }
        None => row.extend((0..26).map(|_| number_or_zero(None))),
    }

    row
}
