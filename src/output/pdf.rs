//! PDF export
//!
//! Renders the plain-text export onto A4 pages using the built-in Helvetica
//! font: long lines are wrapped, pages break every `LINES_PER_PAGE` lines.
//! Text is encoded as WinAnsi (Latin-1 plus typographic punctuation);
//! characters outside that set are replaced with `?`.

use crate::output::text::render_text;
use crate::output::traits::{Exporter, OutputResult};
use crate::record::ResultSet;
use std::io::Write;

const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const MARGIN: u32 = 50;
const FONT_SIZE: u32 = 10;
const LEADING: u32 = 14;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;
const WRAP_WIDTH: usize = 90;

pub struct PdfExporter;

impl Exporter for PdfExporter {
    fn mime_type(&self) -> &'static str {
        "application/pdf"
    }

    fn file_extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, results: &ResultSet) -> OutputResult<Vec<u8>> {
        let pages = paginate(&render_text(results));
        Ok(write_document(&pages)?)
    }
}

/// Splits text into pages of wrapped, sanitized lines; always at least one page
fn paginate(text: &str) -> Vec<Vec<String>> {
    let lines: Vec<String> = text
        .lines()
        .flat_map(|line| wrap(&sanitize(line), WRAP_WIDTH))
        .collect();

    if lines.is_empty() {
        return vec![Vec::new()];
    }
    lines.chunks(LINES_PER_PAGE).map(<[String]>::to_vec).collect()
}

fn sanitize(line: &str) -> String {
    line.chars()
        .map(|c| match c {
            '\t' => ' ',
            c if win_ansi_byte(c).is_some() => c,
            _ => '?',
        })
        .collect()
}

/// Maps a character to its single-byte WinAnsiEncoding code
fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        ' '..='~' | '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '\u{20ac}' => 0x80,
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        _ => return None,
    };
    Some(byte)
}

/// Greedy word wrap on character counts; words longer than `width` are split
fn wrap(line: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in line.split(' ') {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = chars.split_off(width);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }

        let word: String = chars.iter().collect();
        if current.is_empty() {
            current = word;
            current_len = chars.len();
        } else if current_len + 1 + chars.len() <= width {
            current.push(' ');
            current.push_str(&word);
            current_len += 1 + chars.len();
        } else {
            lines.push(std::mem::replace(&mut current, word));
            current_len = chars.len();
        }
    }

    lines.push(current);
    lines
}

/// Encodes a sanitized line as a WinAnsi string literal body
fn encode(line: &str) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(line.len());
    for c in line.chars() {
        if matches!(c, '\\' | '(' | ')') {
            encoded.push(b'\\');
        }
        encoded.push(win_ansi_byte(c).unwrap_or(b'?'));
    }
    encoded
}

fn content_stream(lines: &[String]) -> Vec<u8> {
    let mut stream = format!(
        "BT\n/F1 {} Tf\n{} TL\n{} {} Td\n",
        FONT_SIZE,
        LEADING,
        MARGIN,
        PAGE_HEIGHT - MARGIN
    )
    .into_bytes();
    for line in lines {
        stream.push(b'(');
        stream.extend_from_slice(&encode(line));
        stream.extend_from_slice(b") Tj\nT*\n");
    }
    stream.extend_from_slice(b"ET\n");
    stream
}

/// Writes a complete PDF 1.4 file
///
/// Object layout: 1 catalog, 2 page tree, 3 font, then one page object and
/// one content stream per page.
fn write_document(pages: &[Vec<String>]) -> std::io::Result<Vec<u8>> {
    let mut out: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = Vec::new();

    out.write_all(b"%PDF-1.4\n")?;

    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 4 + 2 * i).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{} 0 R", id))
        .collect::<Vec<_>>()
        .join(" ");

    write_object(&mut out, &mut offsets, b"<< /Type /Catalog /Pages 2 0 R >>")?;
    write_object(
        &mut out,
        &mut offsets,
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, pages.len()).as_bytes(),
    )?;
    write_object(
        &mut out,
        &mut offsets,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    )?;

    for (page, id) in pages.iter().zip(&page_ids) {
        write_object(
            &mut out,
            &mut offsets,
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                PAGE_WIDTH,
                PAGE_HEIGHT,
                id + 1
            )
            .as_bytes(),
        )?;
        let stream = content_stream(page);
        let mut body = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        body.extend_from_slice(&stream);
        body.extend_from_slice(b"endstream");
        write_object(&mut out, &mut offsets, &body)?;
    }

    let xref_offset = out.len();
    writeln!(out, "xref\n0 {}", offsets.len() + 1)?;
    out.write_all(b"0000000000 65535 f \n")?;
    for offset in &offsets {
        write!(out, "{:010} 00000 n \n", offset)?;
    }
    write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        offsets.len() + 1,
        xref_offset
    )?;

    Ok(out)
}

fn write_object(out: &mut Vec<u8>, offsets: &mut Vec<usize>, body: &[u8]) -> std::io::Result<()> {
    offsets.push(out.len());
    writeln!(out, "{} 0 obj", offsets.len())?;
    out.write_all(body)?;
    out.write_all(b"\nendobj\n")
}
