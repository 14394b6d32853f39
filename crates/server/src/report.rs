//! Plain PDF rendering of the reservations report.
//!
//! The document uses the standard Helvetica fonts with WinAnsi encoding, so
//! text outside Latin-1 is replaced by `?`. Pages are US Letter.

use chrono::{DateTime, FixedOffset, Utc};
use models::{
    datetime::{format_date, format_date_time, format_time},
    reservation::{Reservation, ReservationStatus},
    stats::{StatusCounts, StatusFilter},
};
use std::fmt::Write as _;

const PAGE_WIDTH: u32 = 612;
const PAGE_HEIGHT: u32 = 792;
const MARGIN_LEFT: u32 = 56;
const TOP: u32 = 736;
const BOTTOM: u32 = 72;
const TITLE_LIMIT: usize = 30;

/// What the report was filtered by, echoed in its header
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub generated_at: DateTime<Utc>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub space: Option<String>,
    pub statuses: Option<Vec<ReservationStatus>>,
}

impl ReportMeta {
    /// `reservations_report_YYYYmmdd_HHMM.pdf`
    pub fn file_name(&self, tz: &FixedOffset) -> String {
        format!(
            "reservations_report_{}.pdf",
            self.generated_at.with_timezone(tz).format("%Y%m%d_%H%M")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    text: String,
    font: Font,
    size: u32,
    indent: u32,
}

impl Line {
    fn new(text: impl Into<String>, font: Font, size: u32) -> Self {
        Self {
            text: text.into(),
            font,
            size,
            indent: 0,
        }
    }

    fn indented(mut self, indent: u32) -> Self {
        self.indent = indent;
        self
    }

    fn blank() -> Self {
        Self::new("", Font::Regular, 6)
    }

    fn height(&self) -> u32 {
        self.size + self.size / 2
    }
}

/// Renders the report rows, already sorted by space name then start time.
pub fn render_report(
    reservations: &[Reservation],
    meta: &ReportMeta,
    tz: &FixedOffset,
) -> Vec<u8> {
    let lines = layout(reservations, meta, tz);
    let pages = paginate(&lines);
    write_pdf(&pages)
}

fn layout(reservations: &[Reservation], meta: &ReportMeta, tz: &FixedOffset) -> Vec<Line> {
    let mut lines = vec![
        Line::new("Reservations report", Font::Bold, 20),
        Line::new(
            format!("Generated: {}", format_date_time(&meta.generated_at, tz)),
            Font::Regular,
            10,
        ),
    ];

    if let Some(start) = &meta.start {
        lines.push(Line::new(format!("From: {}", format_date_time(start, tz)), Font::Regular, 10));
    }
    if let Some(end) = &meta.end {
        lines.push(Line::new(format!("Until: {}", format_date_time(end, tz)), Font::Regular, 10));
    }
    if let Some(space) = &meta.space {
        lines.push(Line::new(format!("Space: {space}"), Font::Regular, 10));
    }
    if let Some(statuses) = &meta.statuses {
        let labels: Vec<&str> = statuses.iter().map(|s| s.label()).collect();
        lines.push(Line::new(
            format!("Statuses: {}", labels.join(", ")),
            Font::Regular,
            10,
        ));
    }

    lines.push(Line::blank());
    lines.push(Line::new("Summary", Font::Bold, 14));

    if reservations.is_empty() {
        lines.push(Line::new(
            "No reservations match the selected filters.",
            Font::Regular,
            10,
        ));
        return lines;
    }

    lines.push(Line::new(summary(reservations), Font::Regular, 10));

    // Rows arrive grouped by space; start a section whenever the name changes
    let mut current: Option<&str> = None;
    for (i, reservation) in reservations.iter().enumerate() {
        let name = space_name(reservation);
        if current != Some(name) {
            current = Some(name);
            let group: Vec<Reservation> = reservations[i..]
                .iter()
                .take_while(|r| space_name(r) == name)
                .cloned()
                .collect();

            lines.push(Line::blank());
            lines.push(Line::new(name.to_uppercase(), Font::Bold, 12));
            lines.push(Line::new(summary(&group), Font::Regular, 9));
        }

        lines.push(Line::new(row(reservation, tz), Font::Regular, 9).indented(8));
    }

    lines
}

fn space_name(reservation: &Reservation) -> &str {
    reservation
        .space
        .as_ref()
        .map(|s| s.name.as_str())
        .unwrap_or("No space")
}

fn summary(reservations: &[Reservation]) -> String {
    let counts = StatusCounts::tally(reservations);
    let mut text = format!("Total: {}", reservations.len());
    for filter in &StatusFilter::ALL[1..] {
        let _ = write!(text, " | {}: {}", filter.label(), counts.get(*filter));
    }
    text
}

fn row(reservation: &Reservation, tz: &FixedOffset) -> String {
    let title: String = if reservation.title.chars().count() > TITLE_LIMIT {
        let cut: String = reservation.title.chars().take(TITLE_LIMIT).collect();
        format!("{cut}...")
    } else {
        reservation.title.clone()
    };
    let requester = reservation
        .created_by
        .as_ref()
        .map(|u| u.display_name())
        .unwrap_or_else(|| "Unknown".to_string());

    format!(
        "{} {}-{}  {}  ({})  [{}]",
        format_date(&reservation.start_at, tz),
        format_time(&reservation.start_at, tz),
        format_time(&reservation.end_at, tz),
        title,
        requester,
        reservation.status.label()
    )
}

fn paginate(lines: &[Line]) -> Vec<Vec<(u32, Line)>> {
    let mut pages = Vec::new();
    let mut page = Vec::new();
    let mut y = TOP;

    for line in lines {
        let height = line.height();
        if y < BOTTOM + height && !page.is_empty() {
            pages.push(std::mem::take(&mut page));
            y = TOP;
        }
        y -= height;
        page.push((y, line.clone()));
    }
    if !page.is_empty() || pages.is_empty() {
        pages.push(page);
    }

    pages
}

/// Latin-1 bytes of a PDF literal string, with delimiters escaped
fn pdf_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            ' '..='~' => out.push(c as u8),
            '\u{a0}'..='\u{ff}' => out.push(c as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

fn page_content(lines: &[(u32, Line)], number: usize, total: usize) -> Vec<u8> {
    let mut content = Vec::new();
    for (y, line) in lines {
        if line.text.is_empty() {
            continue;
        }
        content.extend_from_slice(
            format!(
                "BT /{} {} Tf {} {} Td (",
                line.font.resource(),
                line.size,
                MARGIN_LEFT + line.indent,
                y
            )
            .as_bytes(),
        );
        content.extend_from_slice(&pdf_text(&line.text));
        content.extend_from_slice(b") Tj ET\n");
    }

    content.extend_from_slice(
        format!(
            "BT /F1 8 Tf {} 40 Td (Page {number} of {total}) Tj ET\n",
            PAGE_WIDTH / 2 - 24
        )
        .as_bytes(),
    );
    content
}

/// Object numbers: 1 catalog, 2 page tree, 3-4 fonts, 5 info, then a
/// page/content pair per page.
fn write_pdf(pages: &[Vec<(u32, Line)>]) -> Vec<u8> {
    let mut objects: Vec<Vec<u8>> = Vec::new();
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 6 + i * 2).collect();

    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
    let kids: Vec<String> = page_ids.iter().map(|id| format!("{id} 0 R")).collect();
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        )
        .into_bytes(),
    );
    objects.push(
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    );
    objects.push(
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    );
    objects.push(b"<< /Title (Reservations report) /Producer (reservations server) >>".to_vec());

    for (i, (page, id)) in pages.iter().zip(&page_ids).enumerate() {
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                id + 1
            )
            .into_bytes(),
        );

        let content = page_content(page, i + 1, pages.len());
        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(&content);
        stream.extend_from_slice(b"\nendstream");
        objects.push(stream);
    }

    let mut out = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_at = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = writeln!(xref, "{offset:010} 00000 n ");
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    );
    out.extend_from_slice(xref.as_bytes());

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use models::{space::Space, user::UserBasic};

    fn tz() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    fn meta() -> ReportMeta {
        ReportMeta {
            generated_at: Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap(),
            start: None,
            end: None,
            space: None,
            statuses: None,
        }
    }

    fn reservation(id: i32, space: &str, title: &str) -> Reservation {
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 14, 0, 0).unwrap();
        Reservation {
            id,
            title: title.to_string(),
            description: String::new(),
            start_at: start,
            end_at: start + chrono::Duration::hours(1),
            status: ReservationStatus::Approved,
            space: Some(Space {
                id: 1,
                name: space.to_string(),
                description: String::new(),
                location: String::new(),
                is_active: true,
                created_at: None,
                updated_at: None,
            }),
            created_by: Some(UserBasic {
                id: 2,
                email: "teacher@fesc.local".to_string(),
                first_name: "Ana".to_string(),
                last_name: "Ruiz".to_string(),
            }),
            approved_by: None,
            decision_at: None,
            decision_note: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_document_structure() {
        let pdf = render_report(&[reservation(1, "Módulo 3", "Clase")], &meta(), &tz());

        assert!(pdf.starts_with(b"%PDF-1.4\n"));
        assert!(pdf.ends_with(b"%%EOF\n"));

        let text = String::from_utf8_lossy(&pdf);
        let tail = text.rsplit("startxref\n").next().unwrap();
        let offset: usize = tail.lines().next().unwrap().parse().unwrap();
        assert!(pdf[offset..].starts_with(b"xref\n"));
        assert!(text.contains("/Count 1"));
    }

    #[test]
    fn test_rows_use_local_time_and_latin1() {
        let pdf = render_report(&[reservation(1, "Módulo 3", "Clase")], &meta(), &tz());

        assert!(contains(&pdf, b"(M\xd3DULO 3)"));
        assert!(contains(&pdf, b"10/03/2024 09:00-10:00  Clase  \\(Ana Ruiz\\)  [Approved]"));
        assert!(contains(&pdf, b"Total: 1 | Pending: 0 | Approved: 1"));
    }

    #[test]
    fn test_text_escaping() {
        assert_eq!(pdf_text("a(b)\\c"), b"a\\(b\\)\\\\c".to_vec());
        assert_eq!(pdf_text("ñ→"), vec![0xf1, b'?']);
    }

    #[test]
    fn test_long_reports_span_pages() {
        let rows: Vec<Reservation> = (0..120)
            .map(|i| reservation(i, "Sala", "A very long reservation title that gets cut"))
            .collect();
        let pdf = render_report(&rows, &meta(), &tz());
        let text = String::from_utf8_lossy(&pdf);

        assert!(!text.contains("/Count 1 "));
        assert!(text.contains("Page 1 of"));
        assert!(text.contains("A very long reservation title ..."));
    }

    #[test]
    fn test_empty_report_still_has_a_page() {
        let pdf = render_report(&[], &meta(), &tz());
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("/Count 1"));
        assert!(text.contains("No reservations match the selected filters."));
    }

    #[test]
    fn test_file_name_uses_local_time() {
        assert_eq!(meta().file_name(&tz()), "reservations_report_20240310_1030.pdf");
    }
}
