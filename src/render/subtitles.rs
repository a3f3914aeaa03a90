use crate::render::style::CaptionStyle;

/// One timed caption line, relative to the clip start.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionLine {
    pub start_secs: f64,
    pub end_secs: f64,
    pub text: String,
}

/// Word-wrap the localized caption and spread the lines across the clip.
///
/// Each line holds for the style's `secs_per_line`; the final line stays up
/// until the clip ends so the screen is never captionless mid-clip.
pub fn plan_caption_lines(
    caption: &str,
    style: &CaptionStyle,
    clip_duration_secs: f64,
) -> Vec<CaptionLine> {
    let text = if style.all_caps {
        caption.to_uppercase()
    } else {
        caption.to_string()
    };

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty()
            && current.chars().count() + 1 + word.chars().count()
                > style.max_chars_per_line as usize
        {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() || clip_duration_secs <= 0.0 {
        return Vec::new();
    }

    // Compress the per-line hold when the copy is longer than the clip.
    let secs_per_line = style
        .secs_per_line
        .min(clip_duration_secs / lines.len() as f64);

    let count = lines.len();
    lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| {
            let start_secs = index as f64 * secs_per_line;
            let end_secs = if index == count - 1 {
                clip_duration_secs
            } else {
                (index + 1) as f64 * secs_per_line
            };
            CaptionLine {
                start_secs,
                end_secs,
                text: line,
            }
        })
        .collect()
}

/// Build a complete ASS document for the planned lines.
pub fn build_ass_document(
    lines: &[CaptionLine],
    style: &CaptionStyle,
    target_width: u32,
    target_height: u32,
) -> Option<String> {
    if lines.is_empty() {
        return None;
    }

    let primary = ass_color(&style.primary_color);
    let outline = ass_color(&style.outline_color);

    let mut content = format!(
        "[Script Info]\nScriptType: v4.00+\nPlayResX: {target_width}\nPlayResY: {target_height}\nWrapStyle: 2\nScaledBorderAndShadow: yes\n\n\
         [V4+ Styles]\nFormat: Name, Fontname, Fontsize, PrimaryColour, OutlineColour, Bold, Italic, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
         Style: Caption,{font},{size},{primary},{outline},0,0,1,{outline_width:.1},0,2,40,40,{margin},1\n\n\
         [Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
        font = style.font_family,
        size = style.font_size,
        outline_width = style.outline_width,
        margin = style.margin_bottom,
    );

    for line in lines {
        content.push_str(&format!(
            "Dialogue: 0,{},{},Caption,,0,0,0,,{}\n",
            ass_time(line.start_secs),
            ass_time(line.end_secs),
            escape_ass_text(&line.text),
        ));
    }

    Some(content)
}

/// ASS stores colors as &HAABBGGRR; incoming values are RGB hex.
fn ass_color(rgb_hex: &str) -> String {
    let hex = rgb_hex.trim_start_matches('#');
    if hex.len() == 6 {
        let (r, g, b) = (&hex[0..2], &hex[2..4], &hex[4..6]);
        format!("&H00{}{}{}", b.to_uppercase(), g.to_uppercase(), r.to_uppercase())
    } else {
        "&H00FFFFFF".to_string()
    }
}

fn ass_time(secs: f64) -> String {
    let secs = secs.max(0.0);
    let hours = (secs / 3600.0) as u32;
    let minutes = ((secs % 3600.0) / 60.0) as u32;
    let rest = secs % 60.0;
    format!("{hours}:{minutes:02}:{rest:05.2}")
}

fn escape_ass_text(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\n', "\\N")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_wrap_at_char_budget() {
        let style = CaptionStyle {
            max_chars_per_line: 12,
            ..Default::default()
        };
        let lines = plan_caption_lines("this caption needs several lines to fit", &style, 30.0);

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.text.chars().count() <= 12);
        }
    }

    #[test]
    fn test_last_line_holds_until_clip_end() {
        let style = CaptionStyle {
            max_chars_per_line: 10,
            secs_per_line: 2.0,
            ..Default::default()
        };
        let lines = plan_caption_lines("short words wrap here", &style, 20.0);

        let last = lines.last().unwrap();
        assert!((last.end_secs - 20.0).abs() < 1e-9);
        for pair in lines.windows(2) {
            assert!((pair[0].end_secs - pair[1].start_secs).abs() < 1e-9);
        }
    }

    #[test]
    fn test_long_copy_compresses_line_hold() {
        let style = CaptionStyle {
            max_chars_per_line: 8,
            secs_per_line: 3.0,
            ..Default::default()
        };
        // Ten-ish lines against a six second clip.
        let lines = plan_caption_lines(
            "one two three four five six seven eight nine ten eleven twelve",
            &style,
            6.0,
        );

        for line in &lines {
            assert!(line.end_secs <= 6.0 + 1e-9);
        }
    }

    #[test]
    fn test_ass_document_shape() {
        let style = CaptionStyle::default();
        let lines = plan_caption_lines("hello vertical world", &style, 10.0);
        let doc = build_ass_document(&lines, &style, 1080, 1920).unwrap();

        assert!(doc.contains("PlayResX: 1080"));
        assert!(doc.contains("PlayResY: 1920"));
        assert_eq!(doc.matches("Dialogue:").count(), lines.len());
    }

    #[test]
    fn test_ass_color_swaps_to_bgr() {
        assert_eq!(ass_color("FF8800"), "&H000088FF");
        assert_eq!(ass_color("#FFFFFF"), "&H00FFFFFF");
    }

    #[test]
    fn test_empty_caption_yields_no_document() {
        let style = CaptionStyle::default();
        let lines = plan_caption_lines("   ", &style, 10.0);
        assert!(lines.is_empty());
        assert!(build_ass_document(&lines, &style, 1080, 1920).is_none());
    }
}
