//! XLSX styles (styles.xml) read/write helpers

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use rentroll_core::style::{Color, FillStyle, FontStyle, NumberFormat, Style};
use rentroll_core::Workbook;

// === Writing ===

#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    /// Global, deduplicated styles. Index corresponds to the cellXfs index (xfId).
    styles: Vec<Style>,
    /// Per-worksheet mapping: local worksheet style index -> global xfId.
    sheet_maps: Vec<HashMap<u32, u32>>,
}

#[derive(Debug, Clone, Copy)]
struct ResolvedXfIds {
    font_id: u32,
    fill_id: u32,
    num_fmt_id: u32,
}

impl XlsxStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut styles: Vec<Style> = Vec::new();
        let mut style_to_xf: HashMap<Style, u32> = HashMap::new();

        // Index 0 is always default style
        let default = Style::default();
        styles.push(default.clone());
        style_to_xf.insert(default, 0);

        let mut sheet_maps: Vec<HashMap<u32, u32>> = Vec::with_capacity(workbook.sheet_count());

        for sheet in workbook.worksheets() {
            let mut map: HashMap<u32, u32> = HashMap::new();
            map.insert(0, 0);

            for (_row, _col, cell) in sheet.iter_cells() {
                let local_idx = cell.style_index;
                if local_idx == 0 || map.contains_key(&local_idx) {
                    continue;
                }

                let style = sheet
                    .style_by_index(local_idx)
                    .cloned()
                    .unwrap_or_default();

                let xf_id = match style_to_xf.get(&style) {
                    Some(&id) => id,
                    None => {
                        let id = styles.len() as u32;
                        styles.push(style.clone());
                        style_to_xf.insert(style, id);
                        id
                    }
                };

                map.insert(local_idx, xf_id);
            }

            sheet_maps.push(map);
        }

        Self { styles, sheet_maps }
    }

    pub(crate) fn xf_id_for(&self, sheet_index: usize, local_style_index: u32) -> u32 {
        self.sheet_maps
            .get(sheet_index)
            .and_then(|m| m.get(&local_style_index).copied())
            .unwrap_or(0)
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        // Build component tables
        let mut font_ids: HashMap<FontStyle, u32> = HashMap::new();
        let mut fonts: Vec<FontStyle> = Vec::new();

        let default_font = FontStyle::default();
        fonts.push(default_font.clone());
        font_ids.insert(default_font, 0);

        let mut fill_ids: HashMap<FillStyle, u32> = HashMap::new();
        let mut fills: Vec<FillStyle> = Vec::new();
        // Excel requires the first two fills to be: none and gray125
        fills.push(FillStyle::None); // id 0
        fills.push(FillStyle::None); // id 1, written as gray125 below
        fill_ids.insert(FillStyle::None, 0);

        // Custom number formats
        let mut numfmt_ids: HashMap<String, u32> = HashMap::new();
        let mut numfmts: Vec<(u32, String)> = Vec::new();
        let mut next_numfmt_id: u32 = 164;

        // Resolve component IDs for each style
        let mut resolved: Vec<ResolvedXfIds> = Vec::with_capacity(self.styles.len());

        for style in &self.styles {
            // Font
            let font_id = match font_ids.get(&style.font) {
                Some(&id) => id,
                None => {
                    let id = fonts.len() as u32;
                    fonts.push(style.font.clone());
                    font_ids.insert(style.font.clone(), id);
                    id
                }
            };

            // Fill
            let fill_id = match style.fill {
                FillStyle::None => 0,
                other => {
                    if let Some(&id) = fill_ids.get(&other) {
                        id
                    } else {
                        let id = fills.len() as u32;
                        fills.push(other);
                        fill_ids.insert(other, id);
                        id
                    }
                }
            };

            // Number format
            let num_fmt_id = match &style.number_format {
                NumberFormat::General => 0,
                NumberFormat::BuiltIn(id) => *id,
                NumberFormat::Custom(code) => {
                    if let Some(&id) = numfmt_ids.get(code) {
                        id
                    } else {
                        let id = next_numfmt_id;
                        next_numfmt_id += 1;
                        numfmt_ids.insert(code.clone(), id);
                        numfmts.push((id, code.clone()));
                        id
                    }
                }
            };

            resolved.push(ResolvedXfIds {
                font_id,
                fill_id,
                num_fmt_id,
            });
        }

        // Write XML
        let mut xml = String::new();
        xml.push_str(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !numfmts.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", numfmts.len()));
            for (id, code) in &numfmts {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_xml_attr(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        // Fonts
        xml.push_str(&format!("\n  <fonts count=\"{}\">", fonts.len()));
        for font in &fonts {
            xml.push_str("\n    ");
            xml.push_str(&write_font(font));
        }
        xml.push_str("\n  </fonts>");

        // Fills (ids 0 and 1 are the mandatory none/gray125 pair)
        xml.push_str(&format!("\n  <fills count=\"{}\">", fills.len()));
        xml.push_str("\n    <fill><patternFill patternType=\"none\"/></fill>");
        xml.push_str("\n    <fill><patternFill patternType=\"gray125\"/></fill>");
        for fill in fills.iter().skip(2) {
            xml.push_str("\n    ");
            xml.push_str(&write_fill(fill));
        }
        xml.push_str("\n  </fills>");

        // Borders (only the default)
        xml.push_str(
            r#"
  <borders count="1">
    <border><left/><right/><top/><bottom/><diagonal/></border>
  </borders>"#,
        );

        // cellStyleXfs (required)
        xml.push_str(
            r#"
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        // cellXfs
        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", self.styles.len()));
        for (i, ids) in resolved.iter().enumerate() {
            let style = &self.styles[i];
            xml.push_str("\n    ");
            xml.push_str(&write_xf(style, *ids));
        }
        xml.push_str("\n  </cellXfs>");

        // cellStyles (required)
        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>"#,
        );

        xml.push_str("\n</styleSheet>");
        xml
    }
}

fn escape_xml_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn write_color_attrs(color: &Color) -> String {
    match color {
        Color::Auto => " indexed=\"64\"".to_string(),
        Color::Rgb { r, g, b } => format!(" rgb=\"FF{:02X}{:02X}{:02X}\"", r, g, b),
        Color::Indexed(i) => format!(" indexed=\"{}\"", i),
        Color::Theme { index, tint } => {
            if *tint == 0 {
                format!(" theme=\"{}\"", index)
            } else {
                format!(" theme=\"{}\" tint=\"{}\"", index, (*tint as f64) / 100.0)
            }
        }
    }
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    if font.underline {
        s.push_str("<u/>");
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));

    if !matches!(font.color, Color::Auto) {
        s.push_str(&format!("<color{}/>", write_color_attrs(&font.color)));
    }

    s.push_str(&format!("<name val=\"{}\"/>", escape_xml_attr(&font.name)));
    s.push_str("</font>");
    s
}

fn write_fill(fill: &FillStyle) -> String {
    match fill {
        FillStyle::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        FillStyle::Solid { color } => {
            format!(
                "<fill><patternFill patternType=\"solid\"><fgColor{}/><bgColor indexed=\"64\"/></patternFill></fill>",
                write_color_attrs(color)
            )
        }
    }
}

fn write_xf(style: &Style, ids: ResolvedXfIds) -> String {
    let mut attrs = String::new();
    if ids.num_fmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if style.font != FontStyle::default() {
        attrs.push_str(" applyFont=\"1\"");
    }
    if style.fill != FillStyle::None {
        attrs.push_str(" applyFill=\"1\"");
    }

    format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"0\" xfId=\"0\"{}/>",
        ids.num_fmt_id, ids.font_id, ids.fill_id, attrs
    )
}

// === Reading ===

pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<Style>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut numfmts: HashMap<u32, String> = HashMap::new();
    let mut fonts: Vec<FontStyle> = Vec::new();
    let mut fills: Vec<FillStyle> = Vec::new();
    let mut cell_xfs: Vec<Style> = Vec::new();

    // Current objects while parsing
    let mut current_font: Option<FontStyle> = None;
    let mut in_fill = false;
    let mut current_fill_solid = false;
    let mut current_fill_fg: Color = Color::Auto;
    let mut in_cell_xfs = false;

    loop {
        let event = xml_reader.read_event_into(&mut buf);
        match event {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let is_empty = matches!(event, Ok(Event::Empty(_)));
                match e.name().as_ref() {
                    b"cellXfs" => {
                        in_cell_xfs = true;
                    }

                    b"font" => {
                        if is_empty {
                            fonts.push(FontStyle::default());
                        } else {
                            current_font = Some(FontStyle::default());
                        }
                    }

                    b"fill" => {
                        if is_empty {
                            fills.push(FillStyle::None);
                        } else {
                            in_fill = true;
                            current_fill_solid = false;
                            current_fill_fg = Color::Auto;
                        }
                    }

                    b"patternFill" if in_fill => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"patternType" {
                                if let Ok(v) = attr.unescape_value() {
                                    current_fill_solid = v.as_ref() == "solid";
                                }
                            }
                        }
                    }

                    b"numFmt" => {
                        let mut id = None;
                        let mut code = None;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"numFmtId" => {
                                    id = attr.unescape_value().ok().and_then(|s| s.parse().ok())
                                }
                                b"formatCode" => {
                                    code = attr.unescape_value().ok().map(|s| s.to_string())
                                }
                                _ => {}
                            }
                        }
                        if let (Some(id), Some(code)) = (id, code) {
                            numfmts.insert(id, code);
                        }
                    }

                    // Font sub-elements
                    b"b" => {
                        if let Some(font) = current_font.as_mut() {
                            font.bold = true;
                        }
                    }
                    b"i" => {
                        if let Some(font) = current_font.as_mut() {
                            font.italic = true;
                        }
                    }
                    b"u" => {
                        if let Some(font) = current_font.as_mut() {
                            font.underline = true;
                        }
                    }
                    b"sz" => {
                        if let Some(font) = current_font.as_mut() {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"val" {
                                    if let Ok(v) = attr.unescape_value() {
                                        font.size = v.parse::<f64>().unwrap_or(font.size);
                                    }
                                }
                            }
                        }
                    }
                    b"name" => {
                        if let Some(font) = current_font.as_mut() {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"val" {
                                    if let Ok(v) = attr.unescape_value() {
                                        font.name = v.to_string();
                                    }
                                }
                            }
                        }
                    }
                    b"color" => {
                        if let Some(font) = current_font.as_mut() {
                            font.color = parse_color_attrs(e);
                        }
                    }
                    b"fgColor" if in_fill => {
                        current_fill_fg = parse_color_attrs(e);
                    }

                    b"xf" if in_cell_xfs => {
                        let mut num_fmt_id = 0u32;
                        let mut font_id = 0u32;
                        let mut fill_id = 0u32;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"numFmtId" => {
                                    num_fmt_id = attr
                                        .unescape_value()
                                        .ok()
                                        .and_then(|s| s.parse().ok())
                                        .unwrap_or(0);
                                }
                                b"fontId" => {
                                    font_id = attr
                                        .unescape_value()
                                        .ok()
                                        .and_then(|s| s.parse().ok())
                                        .unwrap_or(0);
                                }
                                b"fillId" => {
                                    fill_id = attr
                                        .unescape_value()
                                        .ok()
                                        .and_then(|s| s.parse().ok())
                                        .unwrap_or(0);
                                }
                                _ => {}
                            }
                        }
                        cell_xfs.push(resolve_style(
                            num_fmt_id, font_id, fill_id, &numfmts, &fonts, &fills,
                        ));
                    }

                    _ => {}
                }
            }

            Ok(Event::End(e)) => match e.name().as_ref() {
                b"font" => {
                    if let Some(f) = current_font.take() {
                        fonts.push(f);
                    }
                }
                b"fill" => {
                    if in_fill {
                        let fill = if current_fill_solid {
                            FillStyle::Solid {
                                color: current_fill_fg,
                            }
                        } else {
                            FillStyle::None
                        };
                        fills.push(fill);
                        in_fill = false;
                    }
                }
                b"cellXfs" => {
                    in_cell_xfs = false;
                }
                _ => {}
            },

            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }

        buf.clear();
    }

    if cell_xfs.is_empty() {
        cell_xfs.push(Style::default());
    }

    Ok(cell_xfs)
}

fn resolve_style(
    num_fmt_id: u32,
    font_id: u32,
    fill_id: u32,
    numfmts: &HashMap<u32, String>,
    fonts: &[FontStyle],
    fills: &[FillStyle],
) -> Style {
    let mut style = Style::default();
    style.font = fonts.get(font_id as usize).cloned().unwrap_or_default();
    style.fill = fills.get(fill_id as usize).copied().unwrap_or_default();

    style.number_format = if num_fmt_id == 0 {
        NumberFormat::General
    } else if let Some(code) = numfmts.get(&num_fmt_id) {
        NumberFormat::Custom(code.clone())
    } else {
        NumberFormat::BuiltIn(num_fmt_id)
    };

    style
}

fn parse_color_attrs(e: &quick_xml::events::BytesStart<'_>) -> Color {
    // Priority: rgb > theme > indexed > auto
    let mut rgb: Option<String> = None;
    let mut theme: Option<u8> = None;
    let mut tint: Option<f64> = None;
    let mut indexed: Option<u8> = None;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"rgb" => {
                rgb = attr.unescape_value().ok().map(|s| s.to_string());
            }
            b"theme" => {
                theme = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse::<u8>().ok());
            }
            b"tint" => {
                tint = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse::<f64>().ok());
            }
            b"indexed" => {
                indexed = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse::<u8>().ok());
            }
            _ => {}
        }
    }

    if let Some(rgb) = rgb {
        if let Some(color) = Color::from_hex(&rgb) {
            return color;
        }
    }

    if let Some(index) = theme {
        let tint_i8 = tint.map(|t| (t * 100.0).round() as i8).unwrap_or(0);
        return Color::Theme {
            index,
            tint: tint_i8,
        };
    }

    if let Some(i) = indexed {
        // indexed 64 is the "system foreground" sentinel
        if i == 64 {
            return Color::Auto;
        }
        return Color::Indexed(i);
    }

    Color::Auto
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentroll_core::Worksheet;

    #[test]
    fn test_style_table_dedup_across_sheets() {
        let mut wb = Workbook::empty();

        let mut ws1 = Worksheet::new("A");
        ws1.set_cell_value_at(0, 0, "x").unwrap();
        ws1.set_cell_style_at(0, 0, &Style::new().bold(true)).unwrap();
        wb.add_existing_worksheet(ws1).unwrap();

        let mut ws2 = Worksheet::new("B");
        ws2.set_cell_value_at(0, 0, "y").unwrap();
        ws2.set_cell_style_at(0, 0, &Style::new().bold(true)).unwrap();
        wb.add_existing_worksheet(ws2).unwrap();

        let table = XlsxStyleTable::build(&wb);
        let idx1 = wb.worksheet(0).unwrap().cell_style_index_at(0, 0);
        let idx2 = wb.worksheet(1).unwrap().cell_style_index_at(0, 0);
        assert_eq!(table.xf_id_for(0, idx1), table.xf_id_for(1, idx2));
    }

    #[test]
    fn test_styles_xml_roundtrip() {
        let mut wb = Workbook::new();
        let ws = wb.worksheet_mut(0).unwrap();
        ws.set_cell_value_at(0, 0, "header").unwrap();
        ws.set_cell_style_at(0, 0, &Style::new().bold(true).font_color(Color::rgb(226, 0, 0)))
            .unwrap();

        let table = XlsxStyleTable::build(&wb);
        let xml = table.to_styles_xml();

        let styles = read_styles_xml(xml.as_bytes()).unwrap();
        assert!(styles
            .iter()
            .any(|s| s.font.bold && s.font.color == Color::rgb(226, 0, 0)));
    }
}
