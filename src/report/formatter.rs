use chrono::NaiveDate;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use super::competency::evaluate;
use super::describe::DescriptionSet;
use crate::records::types::{PersonalRecord, TestReport};
use crate::scoring::{classify_iq, BandTable, ABILITY_TABLE, IQ_TABLE, PHQ_TABLE, TRAIT_TABLE};

const PLACEHOLDER: &str = "-";

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// `DD/MM/YYYY`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Derived values (IQ, WA GE, composites) always show two decimals.
pub fn format_decimal(value: f64) -> String {
    format!("{:.2}", value)
}

/// Raw scores show as whole numbers when they are whole.
pub fn format_score(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn or_placeholder(value: Option<&str>) -> &str {
    value.filter(|s| !s.trim().is_empty()).unwrap_or(PLACEHOLDER)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

/// Records as a table: index, test number, name, sex, company, test date and
/// the record id taken by `show`, `delete` and `export --id`. Names and
/// companies are shortened to fit the terminal; ids never are.
pub fn format_record_table(records: &[PersonalRecord], use_colors: bool) -> String {
    format_record_table_with_width(records, get_terminal_width(), use_colors)
}

fn format_record_table_with_width(
    records: &[PersonalRecord],
    term_width: Option<usize>,
    use_colors: bool,
) -> String {
    if records.is_empty() {
        return "No test records found.".to_string();
    }

    let separator = "  ";
    let index_width = 3;
    let no_tes_width = records
        .iter()
        .map(|r| r.info.no_tes.chars().count())
        .max()
        .unwrap_or(0);
    let sex_width = "Perempuan".len();
    let date_width = "DD/MM/YYYY".len();
    let id_width = records
        .iter()
        .map(|r| r.id.chars().count())
        .max()
        .unwrap_or(0);

    let mut name_width = records
        .iter()
        .map(|r| r.info.nama_peserta.chars().count())
        .max()
        .unwrap_or(0);
    let mut company_width = records
        .iter()
        .map(|r| or_placeholder(r.info.nama_pt.as_deref()).chars().count())
        .max()
        .unwrap_or(1);

    if let Some(width) = term_width {
        let fixed = index_width
            + 1
            + no_tes_width
            + sex_width
            + date_width
            + id_width
            + separator.len() * 5;
        let available = width.saturating_sub(fixed).max(20);
        if name_width + company_width > available {
            name_width = name_width.min((available * 3 / 5).max(10));
            company_width = company_width.min(available.saturating_sub(name_width).max(5));
        }
    }

    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let info = &record.info;
            let index_str = format!("{:>2}.", idx + 1);
            let no_tes = pad(&info.no_tes, no_tes_width);
            let name = pad(&truncate(&info.nama_peserta, name_width), name_width);
            let sex = pad(info.jenis_kelamin.as_str(), sex_width);
            let company = pad(
                &truncate(or_placeholder(info.nama_pt.as_deref()), company_width),
                company_width,
            );
            let date = pad(&format_date(info.tanggal_tes), date_width);

            let line = if use_colors {
                format!(
                    "{} {}{}{}{}{}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    no_tes.cyan(),
                    separator,
                    name.bold(),
                    separator,
                    sex,
                    separator,
                    company,
                    separator,
                    date.dimmed(),
                    separator,
                    record.id.dimmed()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}{}{}{}{}",
                    index_str,
                    no_tes,
                    separator,
                    name,
                    separator,
                    sex,
                    separator,
                    company,
                    separator,
                    date,
                    separator,
                    record.id
                )
            };
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Total count plus the most recent records.
pub fn format_dashboard(total: u64, recent: &[PersonalRecord], use_colors: bool) -> String {
    let heading = format!("Total test records: {}", total);
    let heading = if use_colors {
        heading.bold().to_string()
    } else {
        heading
    };

    let mut out = vec![heading, String::new(), "Most recent:".to_string()];
    out.push(format_record_table(recent, use_colors));
    out.join("\n")
}

fn section(title: &str, use_colors: bool) -> String {
    if use_colors {
        title.bold().underline().to_string()
    } else {
        format!("{}\n{}", title, "=".repeat(title.chars().count()))
    }
}

fn field(label: &str, value: &str) -> String {
    format!("  {} {}", pad(&format!("{}:", label), 28), value)
}

/// Full report for one record.
pub fn format_report(
    report: &TestReport,
    descriptions: &DescriptionSet,
    use_colors: bool,
) -> String {
    let info = &report.personal.info;
    let mut out = Vec::new();

    out.push(section("Laporan Tes Psikologis", use_colors));
    out.push(field("No Tes", &info.no_tes));
    out.push(field("Nama Peserta", &info.nama_peserta));
    out.push(field("Tanggal Lahir", &format_date(info.tanggal_lahir)));
    out.push(field("Nama PT", or_placeholder(info.nama_pt.as_deref())));
    out.push(field("SDR/SDRI", info.sdr_sdri.as_str()));
    out.push(field("Jenis Kelamin", info.jenis_kelamin.as_str()));
    out.push(field("Tanggal Tes", &format_date(info.tanggal_tes)));
    out.push(field("PHQ", or_placeholder(info.phq.as_deref())));
    out.push(field(
        "Keterangan PHQ",
        or_placeholder(info.keterangan_phq.as_deref()),
    ));
    out.push(String::new());

    out.push(section("IST", use_colors));
    match &report.ist {
        Some(ist) => {
            out.push(field("SE / Konkrit Praktis", &format_score(ist.raw.se_konkrit_praktis)));
            out.push(field("WA / Verbal", &format_score(ist.raw.wa_verbal)));
            out.push(field("AN / Fleksibilitas Pikir", &format_score(ist.raw.an_fleksibilitas_pikir)));
            out.push(field(
                "GE / Daya Abstraksi Verbal",
                &format_score(ist.raw.ge_daya_abstraksi_verbal),
            ));
            out.push(field("RA / Berpikir Praktis", &format_score(ist.raw.ra_berpikir_praktis)));
            let classification = ist
                .iq_classification
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| classify_iq(ist.iq).label().to_string());
            out.push(field(
                "IQ",
                &format!("{} ({})", format_decimal(ist.iq), classification),
            ));
            out.push(field("WA GE", &format_decimal(ist.wa_ge)));
        }
        None => out.push("  No IST results recorded.".to_string()),
    }
    out.push(String::new());

    out.push(section("PAPIKOSTICK", use_colors));
    match &report.papikostick {
        Some(papi) => {
            for chunk in papi.raw.letters().chunks(10) {
                let line = chunk
                    .iter()
                    .map(|(letter, value)| format!("{}={}", letter, format_score(*value)))
                    .collect::<Vec<_>>()
                    .join("  ");
                out.push(format!("  {}", line));
            }
            let composites = papi
                .composites
                .named()
                .iter()
                .map(|(name, value)| format!("{}={}", name, format_decimal(*value)))
                .collect::<Vec<_>>()
                .join("  ");
            out.push(format!("  {}", composites));
        }
        None => out.push("  No PAPIKOSTICK results recorded.".to_string()),
    }
    out.push(String::new());

    out.push(section("Kompetensi & Hasil Evaluasi", use_colors));
    for line in evaluate(report, descriptions) {
        let label = format!("{} ({})", line.name, line.source);
        let summary = line.summary();
        if use_colors {
            out.push(format!("  {} {}", pad(&format!("{}:", label), 40).bold(), summary));
        } else {
            out.push(format!("  {} {}", pad(&format!("{}:", label), 40), summary));
        }
    }

    out.join("\n")
}

fn format_table<B: Copy + std::fmt::Display + 'static>(title: &str, table: &BandTable<B>) -> String {
    let mut lines = vec![format!("{}:", title)];
    for (threshold, band) in table.rows {
        lines.push(format!("  {:<16} {}", threshold.to_string(), band));
    }
    lines.push(format!("  {:<16} {}", "otherwise", table.fallback));
    lines.join("\n")
}

/// The classification tables, first matching row wins.
pub fn format_band_tables() -> String {
    [
        format_table("IQ", &IQ_TABLE),
        format_table("PHQ", &PHQ_TABLE),
        format_table("Trait (PAPIKOSTICK)", &TRAIT_TABLE),
        format_table("Ability (IST competencies)", &ABILITY_TABLE),
    ]
    .join("\n\n")
}
