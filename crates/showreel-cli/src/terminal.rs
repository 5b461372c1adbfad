//! Terminal presentation port
//!
//! Draws the demo as a chat transcript. Text that is still being typed is
//! redrawn in place on the current line when the output is a terminal; on
//! pipes and files only the settled line is written.

use console::{style, Term};
use showreel::booking::{BookingStep, BookingView, SummaryField, MODAL_TITLE};
use showreel::calendar::TIME_SLOTS;
use showreel::{
    Item, PostedMessage, PresentationPort, Region, ShowreelResult, Signal, Speaker,
};
use std::collections::HashMap;
use std::io::Write;

const CLEAR_LINE: &str = "\r\x1b[2K";

/// [`PresentationPort`] that renders to a writer
#[derive(Debug)]
pub struct TerminalPort<W: Write + Send = Term> {
    out: W,
    use_color: bool,
    live_updates: bool,
    quiet: bool,
    live: Option<(Region, String)>,
    bubbles: HashMap<String, (Speaker, String)>,
    banner: String,
    record_signals: bool,
    signals: Vec<Signal>,
}

impl TerminalPort<Term> {
    /// Render to stdout, redrawing in place when stdout is a terminal
    #[must_use]
    pub fn stdout(use_color: bool, quiet: bool) -> Self {
        let term = Term::stdout();
        let live_updates = term.is_term();
        Self::new(term, use_color, live_updates, quiet)
    }
}

impl<W: Write + Send> TerminalPort<W> {
    /// Render to any writer
    pub fn new(out: W, use_color: bool, live_updates: bool, quiet: bool) -> Self {
        Self {
            out,
            use_color,
            live_updates,
            quiet,
            live: None,
            bubbles: HashMap::new(),
            banner: String::new(),
            record_signals: false,
            signals: Vec::new(),
        }
    }

    /// Keep every emitted signal for [`Self::transcript_json`]. Off by
    /// default, since an endless run would grow the log without bound.
    #[must_use]
    pub fn with_signal_recording(mut self, on: bool) -> Self {
        self.record_signals = on;
        self
    }

    /// The underlying writer
    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Signals emitted so far; empty unless recording is on
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Signals serialized as a JSON array
    pub fn transcript_json(&self) -> ShowreelResult<String> {
        Ok(serde_json::to_string_pretty(&self.signals)?)
    }

    fn line(&mut self, text: &str) -> ShowreelResult<()> {
        if self.quiet {
            return Ok(());
        }
        self.settle()?;
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    /// Draw `text` as the in-progress line for `region`
    fn draw_live(&mut self, region: &Region, text: String) -> ShowreelResult<()> {
        if self.quiet {
            return Ok(());
        }
        if self.live.as_ref().is_some_and(|(r, _)| r != region) {
            self.settle()?;
        }
        if self.live_updates {
            write!(self.out, "{CLEAR_LINE}{text}")?;
            self.out.flush()?;
        }
        self.live = Some((region.clone(), text));
        Ok(())
    }

    /// Finish the in-progress line
    fn settle(&mut self) -> ShowreelResult<()> {
        if let Some((_, text)) = self.live.take() {
            if self.live_updates {
                writeln!(self.out)?;
            } else {
                writeln!(self.out, "{text}")?;
            }
        }
        Ok(())
    }

    /// Throw the in-progress line away
    fn discard_live(&mut self) -> ShowreelResult<()> {
        if self.live.take().is_some() && self.live_updates && !self.quiet {
            write!(self.out, "{CLEAR_LINE}")?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn bubble(&self, id: &str, text: &str) -> String {
        let (speaker, stamp) = self
            .bubbles
            .get(id)
            .cloned()
            .unwrap_or((Speaker::Bot, String::new()));
        let (who, indent) = match speaker {
            Speaker::Bot => ("Axie", ""),
            Speaker::User => ("Du", "        "),
        };
        let label = format!("{who} {stamp}");
        let label = match (self.use_color, speaker) {
            (false, _) => label,
            (true, Speaker::Bot) => style(label).cyan().bold().to_string(),
            (true, Speaker::User) => style(label).magenta().bold().to_string(),
        };
        format!("{indent}{label} {text}")
    }

    fn dim(&self, text: &str) -> String {
        if self.use_color {
            style(text).dim().to_string()
        } else {
            text.to_string()
        }
    }

    fn render_view(&mut self, view: &BookingView) -> ShowreelResult<()> {
        let title = if self.use_color {
            style(MODAL_TITLE).bold().underlined().to_string()
        } else {
            format!("=== {MODAL_TITLE} ===")
        };
        self.line("")?;
        self.line(&title)?;
        for row in view.calendar.render_text().lines() {
            self.line(&format!("  {row}"))?;
        }
        let slots: Vec<String> = TIME_SLOTS
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                if i == view.selected_slot {
                    format!("[{slot}]")
                } else {
                    (*slot).to_string()
                }
            })
            .collect();
        self.line(&format!("  Tider: {}", slots.join(" ")))
    }
}

impl<W: Write + Send> PresentationPort for TerminalPort<W> {
    fn reveal(&mut self, region: &Region, text: &str) -> ShowreelResult<()> {
        match region {
            Region::Message(id) => {
                let line = self.bubble(id, text);
                self.draw_live(region, line)
            }
            Region::Input if text.is_empty() => self.discard_live(),
            Region::Input => {
                let line = format!("        > {text}");
                self.draw_live(region, line)
            }
            Region::ContactField(field) => {
                let line = format!("    {}: {text}", field.placeholder());
                self.draw_live(region, line)
            }
            Region::Summary(field) => {
                let label = match field {
                    SummaryField::Date => "Datum",
                    SummaryField::Time => "Tid",
                    SummaryField::Name => "Namn",
                    SummaryField::Email => "E-post",
                };
                self.line(&format!("    {label}: {text}"))
            }
            Region::ConfirmationBanner => {
                self.banner = text.to_string();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn set_visible(&mut self, region: &Region, visible: bool) -> ShowreelResult<()> {
        match (region, visible) {
            (Region::TypingIndicator, true) => {
                let dots = self.dim("Axie skriver ...");
                self.draw_live(region, dots)
            }
            (Region::TypingIndicator, false) => self.discard_live(),
            (Region::PaperPlane, true) => self.line("  ✈  Skickar bokningen ..."),
            (Region::ConfirmationBanner, true) => {
                let banner = std::mem::take(&mut self.banner);
                let mut lines = banner.lines();
                if let Some(title) = lines.next() {
                    let title = if self.use_color {
                        style(format!("✓ {title}")).green().bold().to_string()
                    } else {
                        format!("✓ {title}")
                    };
                    self.line(&title)?;
                }
                for rest in lines {
                    self.line(&format!("  {rest}"))?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn highlight(&mut self, item: Item, on: bool) -> ShowreelResult<()> {
        if on && item == Item::ConfirmButton {
            return self.line("    [ Bekräfta Bokning ]");
        }
        Ok(())
    }

    fn post_message(&mut self, message: &PostedMessage) -> ShowreelResult<()> {
        self.bubbles.insert(
            message.id.clone(),
            (message.speaker, message.timestamp.clone()),
        );
        let region = Region::Message(message.id.clone());
        let line = self.bubble(&message.id, &message.text);
        self.draw_live(&region, line)
    }

    fn set_opacity(&mut self, _region: &Region, _opacity: f32) -> ShowreelResult<()> {
        Ok(())
    }

    fn clear(&mut self, region: &Region) -> ShowreelResult<()> {
        if *region == Region::ChatPanel {
            self.discard_live()?;
            self.bubbles.clear();
        }
        Ok(())
    }

    fn render_booking(&mut self, view: &BookingView) -> ShowreelResult<()> {
        self.render_view(view)
    }

    fn emit(&mut self, signal: Signal) -> ShowreelResult<()> {
        match &signal {
            Signal::CycleStarted { cycle } => {
                let header = format!("── Axie Studio · demo {cycle} ──");
                let header = if self.use_color {
                    style(header).bold().to_string()
                } else {
                    header
                };
                self.line(&header)?;
            }
            Signal::MessageRevealed { .. } => self.settle()?,
            Signal::BookingStepEntered { step } => {
                let index = BookingStep::ALL.iter().position(|s| s == step).unwrap_or(0) + 1;
                self.line(&format!("  ▸ Steg {index}: {}", step.label()))?;
            }
            Signal::CycleFinished { .. } => self.line("")?,
            Signal::BookingModalOpened | Signal::BookingConfirmed { .. } => {}
        }
        if self.record_signals {
            self.signals.push(signal);
        }
        Ok(())
    }
}
