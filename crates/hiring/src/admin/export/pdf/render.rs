use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use super::layout::{DocumentLayout, FontWeight, Tone, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};

const MM_IN_POINTS: f32 = 72.0 / 25.4;
const REGULAR_FONT: Name<'static> = Name(b"F1");
const BOLD_FONT: Name<'static> = Name(b"F2");
const MUTED_GRAY: f32 = 100.0 / 255.0;

/// Serialize a laid-out document using the standard Helvetica faces.
pub fn render(layout: &DocumentLayout, title: &str) -> Vec<u8> {
    let mut pdf = Pdf::new();
    let mut next_id = 1;
    let mut alloc = || {
        let id = Ref::new(next_id);
        next_id += 1;
        id
    };

    let catalog_id = alloc();
    let tree_id = alloc();
    let regular_id = alloc();
    let bold_id = alloc();
    let info_id = alloc();
    let page_ids: Vec<(Ref, Ref)> = layout.pages.iter().map(|_| (alloc(), alloc())).collect();

    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|(page_id, _)| *page_id))
        .count(page_ids.len() as i32);
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr("dosmicos-hiring"));

    pdf.type1_font(regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    let media_box = Rect::new(
        0.0,
        0.0,
        PAGE_WIDTH_MM * MM_IN_POINTS,
        PAGE_HEIGHT_MM * MM_IN_POINTS,
    );

    for (page, (page_id, content_id)) in layout.pages.iter().zip(&page_ids) {
        let mut content = Content::new();
        for line in &page.lines {
            let font = match line.weight {
                FontWeight::Regular => REGULAR_FONT,
                FontWeight::Bold => BOLD_FONT,
            };
            let gray = match line.tone {
                Tone::Ink => 0.0,
                Tone::Muted => MUTED_GRAY,
            };
            let encoded = encode_win_ansi(&line.text);

            content.begin_text();
            content.set_fill_rgb(gray, gray, gray);
            content.set_font(font, line.font_size);
            content.set_text_matrix([
                1.0,
                0.0,
                0.0,
                1.0,
                line.x_mm * MM_IN_POINTS,
                (PAGE_HEIGHT_MM - line.y_mm) * MM_IN_POINTS,
            ]);
            content.show(Str(&encoded));
            content.end_text();
        }

        let mut page_writer = pdf.page(*page_id);
        page_writer
            .media_box(media_box)
            .parent(tree_id)
            .contents(*content_id);
        page_writer
            .resources()
            .fonts()
            .pair(REGULAR_FONT, regular_id)
            .pair(BOLD_FONT, bold_id);
        page_writer.finish();

        pdf.stream(*content_id, &content.finish());
    }

    pdf.finish()
}

/// Map text onto WinAnsiEncoding; characters outside it become `?`.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_ansi_covers_spanish_text() {
        assert_eq!(encode_win_ansi("Año"), vec![b'A', 0xf1, b'o']);
        assert_eq!(encode_win_ansi("¿Qué?"), vec![0xbf, b'Q', b'u', 0xe9, b'?']);
        assert_eq!(encode_win_ansi("“hola”"), vec![0x93, b'h', b'o', b'l', b'a', 0x94]);
        assert_eq!(encode_win_ansi("🚀"), vec![b'?']);
    }
}
