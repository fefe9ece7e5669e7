//! TUI rendering for whorl using ratatui.

mod effects;
mod input;
mod steps;
mod theme;

pub use effects::apply_modal_effect;
pub use input::{InputPump, apply_event, handle_events};
pub use steps::{KeyHint, StepBody, StepView, Tone};
pub use theme::{Glyphs, Palette, glyphs, indeterminate_bar, palette, spinner_frame, styles};

use std::mem;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use whorl_engine::{App, CapturePhase, EnrollmentSnapshot, FlowVariant, UiOptions};

const DIALOG_WIDTH: u16 = 64;
const DIALOG_MIN_WIDTH: u16 = 36;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(1),    // Enrollment summary
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], &palette, &glyphs);
    draw_summary(frame, app, chunks[1], &palette, &glyphs);
    draw_status_bar(frame, app, chunks[2], &palette);

    if app.is_modal_open() {
        draw_dialog(frame, app, &palette, &glyphs);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{} whorl", glyphs.fingerprint),
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  fingerprint enrollment", styles::key_hint(palette)),
    ]));
    frame.render_widget(header, area);
}

fn draw_summary(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let snapshot = app.snapshot();
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        "Fingers",
        styles::title(palette),
    )));
    for id in snapshot.identifiers {
        let (marker, style, status) = if snapshot.enrolled.contains(id) {
            (glyphs.enrolled, styles::success(palette), "enrolled")
        } else {
            (
                glyphs.available,
                styles::key_hint(palette),
                "not enrolled",
            )
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {marker} "), style),
            Span::styled(id.to_string(), Style::default().fg(palette.text_primary)),
            Span::styled(format!("  {status}"), styles::key_hint(palette)),
        ]));
    }

    lines.push(Line::from(""));
    if let Some(finished) = app.last_finished() {
        lines.push(Line::from(Span::styled(
            format!("Last session saved {} enrollment(s).", finished.len()),
            styles::description(palette),
        )));
    }
    let prompt = if snapshot.all_enrolled() {
        "Every finger is enrolled."
    } else {
        "Press Enter to enroll a fingerprint."
    };
    lines.push(Line::from(Span::styled(prompt, styles::description(palette))));

    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let variant = match app.snapshot().variant {
        FlowVariant::TwoPhase => "two-phase",
        FlowVariant::SinglePhase => "single-phase",
    };
    let mut spans = if app.is_modal_open() {
        Vec::new()
    } else {
        vec![
            Span::styled("Enter", styles::key_highlight(palette)),
            Span::styled(" enroll  ", styles::key_hint(palette)),
            Span::styled("q", styles::key_highlight(palette)),
            Span::styled(" quit  ", styles::key_hint(palette)),
        ]
    };
    spans.push(Span::styled(
        format!("[{variant}]"),
        Style::default().fg(palette.text_muted),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_dialog(frame: &mut Frame, app: &mut App, palette: &Palette, glyphs: &Glyphs) {
    let area = frame.area();
    let dialog_width = DIALOG_WIDTH
        .min(area.width.saturating_sub(4))
        .max(DIALOG_MIN_WIDTH.min(area.width));
    let content_width = dialog_width.saturating_sub(4).max(1) as usize; // borders + padding

    let snapshot = app.snapshot();
    let view = StepView::for_step(snapshot.step);
    let lines = dialog_lines(
        &snapshot,
        app.notice(),
        app.tick_count(),
        app.ui_options(),
        palette,
        glyphs,
        content_width,
    );

    let inner_height = lines.len() as u16;
    // Borders plus vertical padding.
    let dialog_height = inner_height.saturating_add(4).min(area.height);
    let base_area = Rect {
        x: area.x + (area.width.saturating_sub(dialog_width) / 2),
        y: area.y + (area.height.saturating_sub(dialog_height) / 2),
        width: dialog_width,
        height: dialog_height,
    };

    let elapsed = app.frame_elapsed();
    let (dialog_area, effect_done) = if let Some(effect) = app.modal_effect_mut() {
        effect.advance(elapsed);
        (
            apply_modal_effect(effect, base_area, area),
            effect.is_finished(),
        )
    } else {
        (base_area, false)
    };

    if effect_done {
        app.clear_modal_effect();
    }

    // Clear background
    frame.render_widget(Clear, dialog_area);

    let border = match view.tone {
        Tone::Neutral => palette.primary,
        Tone::Progress => palette.scan,
        Tone::Positive => palette.success,
        Tone::Negative => palette.error,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(palette.bg_panel))
        .padding(Padding::uniform(1))
        .title(Line::from(vec![Span::styled(
            " Enroll fingerprint ",
            styles::title(palette),
        )]));

    frame.render_widget(Paragraph::new(lines).block(block), dialog_area);
}

/// Dialog content for one snapshot, already wrapped to `width` columns.
#[must_use]
pub fn dialog_lines(
    snapshot: &EnrollmentSnapshot<'_>,
    notice: Option<&str>,
    tick: usize,
    options: UiOptions,
    palette: &Palette,
    glyphs: &Glyphs,
    width: usize,
) -> Vec<Line<'static>> {
    let view = StepView::for_step(snapshot.step);
    let mut lines: Vec<Line<'static>> = Vec::new();

    let headline_style = match view.tone {
        Tone::Positive => styles::success(palette),
        Tone::Negative => styles::error(palette),
        Tone::Neutral | Tone::Progress => styles::description(palette),
    };
    let headline = view.description(snapshot.selection);
    let headline = match view.tone {
        Tone::Positive => format!("{} {headline}", glyphs.matched),
        Tone::Negative => format!("{} {headline}", glyphs.rejected),
        Tone::Neutral | Tone::Progress => headline,
    };
    for row in wrap_text(&headline, width) {
        lines.push(Line::from(Span::styled(row, headline_style)));
    }
    lines.push(Line::from(""));

    match view.body {
        StepBody::Picker => push_picker(&mut lines, snapshot, palette, glyphs, width),
        StepBody::Scanning(phase) => {
            let label = match phase {
                CapturePhase::First => "Reading fingerprint",
                CapturePhase::Confirm => "Confirming fingerprint",
            };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} ", spinner_frame(tick, options)),
                    styles::scanning(palette),
                ),
                Span::styled(format!("{label}..."), styles::title(palette)),
            ]));
            lines.push(Line::from(Span::styled(
                indeterminate_bar(width.min(40), tick, options),
                styles::scanning(palette),
            )));
        }
        StepBody::Captured => {
            lines.push(Line::from(Span::styled(
                format!("{} First reading accepted", glyphs.fingerprint),
                styles::success(palette),
            )));
            lines.push(Line::from(Span::styled(
                "One more reading of the same finger is needed.",
                styles::key_hint(palette),
            )));
        }
        StepBody::AwaitConfirm => {
            lines.push(Line::from(Span::styled(
                format!("{} Ready for the confirming reading", glyphs.fingerprint),
                styles::scanning(palette),
            )));
        }
        StepBody::Enrolled => {
            let total = snapshot.identifiers.len();
            let done = snapshot.enrolled.len();
            lines.push(Line::from(Span::styled(
                format!("{} {done} of {total} fingers enrolled", glyphs.fingerprint),
                styles::success(palette),
            )));
            for id in snapshot.enrolled {
                lines.push(Line::from(Span::styled(
                    format!("  {} {id}", glyphs.bullet),
                    Style::default().fg(palette.text_primary),
                )));
            }
        }
        StepBody::Mismatch => {
            let message = "The readings do not match. Make sure you use the same finger \
                           as the first reading and try again.";
            for row in wrap_text(message, width) {
                lines.push(Line::from(Span::styled(row, styles::description(palette))));
            }
        }
    }

    if let Some(notice) = notice {
        lines.push(Line::from(""));
        for row in wrap_text(&format!("! {notice}"), width) {
            lines.push(Line::from(Span::styled(
                row,
                Style::default().fg(palette.warning),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        glyphs.divider.repeat(width),
        Style::default().fg(palette.primary_dim),
    )));
    let mut hint_spans = Vec::with_capacity(view.hints.len() * 2);
    for (i, hint) in view.hints.iter().enumerate() {
        let lead = if i == 0 { "  " } else { "" };
        hint_spans.push(Span::styled(
            format!("{lead}{}", hint.key),
            styles::key_highlight(palette),
        ));
        hint_spans.push(Span::styled(
            format!(" {}  ", hint.label),
            styles::key_hint(palette),
        ));
    }
    lines.push(Line::from(hint_spans));

    lines
}

fn push_picker(
    lines: &mut Vec<Line<'static>>,
    snapshot: &EnrollmentSnapshot<'_>,
    palette: &Palette,
    glyphs: &Glyphs,
    width: usize,
) {
    lines.push(Line::from(Span::styled("Finger", styles::title(palette))));
    for (i, id) in snapshot.identifiers.iter().enumerate() {
        let selected = snapshot.is_selected(id);
        let enrolled = !snapshot.is_selectable(id);
        let prefix = if selected { glyphs.selected } else { " " };
        let suffix = if enrolled { " (enrolled)" } else { "" };
        let text = format!(" {prefix} {:>2}  {id}{suffix}", i + 1);
        let filler = width.saturating_sub(text.width());

        let style = if enrolled {
            styles::disabled(palette)
        } else if selected {
            Style::default()
                .fg(palette.text_primary)
                .bg(palette.bg_highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.text_secondary)
        };
        let mut spans = vec![Span::styled(text, style)];
        if selected && filler > 0 {
            spans.push(Span::styled(
                " ".repeat(filler),
                Style::default().bg(palette.bg_highlight),
            ));
        }
        lines.push(Line::from(spans));
    }
    if snapshot.all_enrolled() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Every finger is already enrolled.",
            styles::key_hint(palette),
        )));
    }
}

/// Greedy word wrap by display width. Words wider than `width` get their own row.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.width()
        } else {
            current.width() + 1 + word.width()
        };
        if needed > width && !current.is_empty() {
            rows.push(mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || rows.is_empty() {
        rows.push(current);
    }
    rows
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use ratatui::{Terminal, backend::TestBackend, text::Line};
    use whorl_engine::{
        App, EnrollmentSet, EnrollmentSettings, EnrollmentSnapshot, FlowVariant, Identifier,
        SimulatedSensor, Step, UiOptions,
    };

    use super::{StepBody, StepView, dialog_lines, draw, glyphs, palette, wrap_text};

    fn id(label: &str) -> Identifier {
        Identifier::new(label).unwrap()
    }

    fn text(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render(step: Step, selection: Option<&Identifier>, enrolled: &EnrollmentSet) -> String {
        let identifiers = [id("Right index"), id("Left index")];
        let snapshot = EnrollmentSnapshot {
            step,
            selection,
            enrolled,
            identifiers: &identifiers,
            variant: FlowVariant::TwoPhase,
        };
        let options = UiOptions {
            ascii_only: true,
            ..UiOptions::default()
        };
        text(&dialog_lines(
            &snapshot,
            None,
            0,
            options,
            &palette(options),
            &glyphs(options),
            48,
        ))
    }

    #[test]
    fn every_step_renders_a_description_body_and_hints() {
        let right = id("Right index");
        let enrolled = EnrollmentSet::default();
        for step in Step::ALL {
            let view = StepView::for_step(step);
            assert_eq!(view.step, step);
            assert!(!view.hints.is_empty(), "{step} has no key hints");
            assert!(!view.description(Some(&right)).is_empty(), "{step} has no description");

            let rendered = render(step, Some(&right), &enrolled);
            let body_rows = rendered.lines().filter(|row| !row.trim().is_empty()).count();
            assert!(body_rows >= 4, "{step} rendered too little:\n{rendered}");
        }
    }

    #[test]
    fn scanning_steps_share_a_body_with_different_phases() {
        assert_ne!(
            StepView::for_step(Step::Scanning).body,
            StepView::for_step(Step::ConfirmScanning).body
        );
        assert!(matches!(
            StepView::for_step(Step::ConfirmScanning).body,
            StepBody::Scanning(_)
        ));
    }

    #[test]
    fn picker_marks_enrolled_identifiers() {
        let mut enrolled = EnrollmentSet::default();
        enrolled.insert(id("Right index"));
        let rendered = render(Step::Select, None, &enrolled);
        assert!(rendered.contains("Right index (enrolled)"), "{rendered}");
        assert!(!rendered.contains("Left index (enrolled)"), "{rendered}");
    }

    #[test]
    fn scanning_description_names_the_selection() {
        let left = id("Left index");
        let rendered = render(Step::Scanning, Some(&left), &EnrollmentSet::default());
        assert!(rendered.contains("Left index"), "{rendered}");
        assert!(rendered.contains("Reading fingerprint"), "{rendered}");
    }

    #[test]
    fn wrap_text_respects_width() {
        let rows = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert!(rows.iter().all(|row| row.len() <= 10), "{rows:?}");
        assert_eq!(rows.join(" "), "the quick brown fox jumps over the lazy dog");
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }

    #[test]
    fn draw_renders_page_and_open_dialog() {
        let mut app = App::new(
            EnrollmentSettings {
                variant: FlowVariant::TwoPhase,
                identifiers: vec![id("Right index"), id("Left index")],
            },
            Arc::new(SimulatedSensor::new(Duration::from_secs(3), 1.0)),
            Duration::from_secs(60),
            UiOptions {
                reduced_motion: true,
                ..UiOptions::default()
            },
        );
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();

        terminal.draw(|frame| draw(frame, &mut app)).unwrap();
        let page: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(page.contains("Press Enter to enroll"));
        assert!(!page.contains("Enroll fingerprint"));

        app.open_modal();
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();
        let dialog: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(dialog.contains("Enroll fingerprint"));
        assert!(dialog.contains("Choose the finger"));
    }
}
