//! Page layout for the single-application report, in millimetres from the top-left corner.

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 20.0;
pub const MAX_TEXT_WIDTH_MM: f32 = PAGE_WIDTH_MM - MARGIN_MM * 2.0;
/// A body line placed below this offset moves to a new page first.
pub const LINE_BREAK_Y_MM: f32 = 270.0;
/// Section headers get more room so they are not orphaned at the foot of a page.
pub const SECTION_BREAK_Y_MM: f32 = 250.0;

const POINT_IN_MM: f32 = 25.4 / 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Ink,
    Muted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x_mm: f32,
    /// Baseline offset from the top edge.
    pub y_mm: f32,
    pub font_size: f32,
    pub weight: FontWeight,
    pub tone: Tone,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPage {
    pub lines: Vec<PlacedLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub pages: Vec<LayoutPage>,
}

impl DocumentLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn lines(&self) -> impl Iterator<Item = &PlacedLine> {
        self.pages.iter().flat_map(|page| page.lines.iter())
    }
}

/// Stateful writer that flows text down the page, opening new pages as needed.
#[derive(Debug)]
pub struct LayoutCursor {
    pages: Vec<LayoutPage>,
    y_mm: f32,
}

impl Default for LayoutCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCursor {
    pub fn new() -> Self {
        Self {
            pages: vec![LayoutPage::default()],
            y_mm: MARGIN_MM,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(LayoutPage::default());
        self.y_mm = MARGIN_MM;
    }

    fn place(&mut self, text: String, font_size: f32, weight: FontWeight, tone: Tone) {
        let line = PlacedLine {
            text,
            x_mm: MARGIN_MM,
            y_mm: self.y_mm,
            font_size,
            weight,
            tone,
        };
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(line);
        }
    }

    pub fn gap(&mut self, mm: f32) {
        self.y_mm += mm;
    }

    /// A single unwrapped line followed by an explicit advance, used by the title block.
    pub fn heading(&mut self, text: &str, font_size: f32, tone: Tone, weight: FontWeight, advance_mm: f32) {
        self.place(text.to_string(), font_size, weight, tone);
        self.y_mm += advance_mm;
    }

    pub fn section_title(&mut self, title: &str) {
        if self.y_mm > SECTION_BREAK_Y_MM {
            self.new_page();
        }
        self.y_mm += 6.0;
        self.place(title.to_uppercase(), 12.0, FontWeight::Bold, Tone::Muted);
        self.y_mm += 8.0;
    }

    pub fn wrapped_text(&mut self, text: &str, font_size: f32, weight: FontWeight) {
        for line in wrap_text(text, font_size, weight, MAX_TEXT_WIDTH_MM) {
            if self.y_mm > LINE_BREAK_Y_MM {
                self.new_page();
            }
            self.place(line, font_size, weight, Tone::Ink);
            self.y_mm += font_size * 0.5;
        }
        self.y_mm += 4.0;
    }

    pub fn finish(self) -> DocumentLayout {
        DocumentLayout { pages: self.pages }
    }
}

/// Approximate Helvetica advance width in em units.
fn glyph_em(c: char, weight: FontWeight) -> f32 {
    let base = match c {
        ' ' | '\'' | '|' | 'i' | 'j' | 'l' | '!' | '.' | ',' | ':' | ';' | 'í' | 'ì' => 0.28,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' | '/' | '"' => 0.34,
        'm' | 'w' | 'M' | 'W' | '@' | '%' | 'æ' | 'Æ' | 'œ' | 'Œ' | '—' => 0.89,
        c if c.is_ascii_digit() => 0.556,
        c if c.is_uppercase() => 0.70,
        _ => 0.556,
    };
    match weight {
        FontWeight::Regular => base,
        FontWeight::Bold => base * 1.06,
    }
}

pub fn text_width_mm(text: &str, font_size: f32, weight: FontWeight) -> f32 {
    text.chars().map(|c| glyph_em(c, weight)).sum::<f32>() * font_size * POINT_IN_MM
}

/// Break `text` into lines no wider than `max_width_mm`.
///
/// Explicit newlines are kept, whitespace between words collapses to one space, and a word
/// wider than a full line is split across lines. No character other than whitespace is lost.
pub fn wrap_text(text: &str, font_size: f32, weight: FontWeight, max_width_mm: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if text_width_mm(&candidate, font_size, weight) <= max_width_mm {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if text_width_mm(word, font_size, weight) <= max_width_mm {
                current.push_str(word);
            } else {
                let mut chunks = split_long_word(word, font_size, weight, max_width_mm);
                current = chunks.pop().unwrap_or_default();
                lines.extend(chunks);
            }
        }
        lines.push(current);
    }

    lines
}

fn split_long_word(word: &str, font_size: f32, weight: FontWeight, max_width_mm: f32) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut chunk = String::new();
    for c in word.chars() {
        chunk.push(c);
        if chunk.chars().count() > 1 && text_width_mm(&chunk, font_size, weight) > max_width_mm {
            chunk.pop();
            chunks.push(std::mem::replace(&mut chunk, c.to_string()));
        }
    }
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
    chunks
}
