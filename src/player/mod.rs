//! Player — interactive terminal playback of a frame container.
//!
//! The player does not simulate anything; it treats the container as an
//! immutable, authoritative timeline and only decides how to show it.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::{cursor, event, execute, queue, style, terminal};

use crate::circuit::layout_circuit;
use crate::circuit::wire::{component_id, distance_marker_y, Wire};
use crate::types::{ComponentState, Frame, FrameContainer};

/// Rows reserved above the canvas for the menu bar.
const CANVAS_OFFSET: u16 = 1;
const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 12;

pub struct Player {
    container: FrameContainer,
    wiring: BTreeMap<String, Vec<Wire>>,
    current_frame: usize,
    autoplay: bool,
}

impl Player {
    pub fn new(container: FrameContainer) -> Self {
        let wiring = layout_circuit(&container.board, &container.frames).unwrap_or_default();
        Self {
            container,
            wiring,
            current_frame: 0,
            autoplay: false,
        }
    }

    /// Play the timeline in the terminal.
    ///
    /// Sets up the terminal, enters the event loop, and restores the terminal
    /// on exit (even on error).
    pub fn play(&mut self) -> Result<()> {
        if self.container.error {
            bail!("Frame container is marked as failed; nothing to play");
        }
        if self.container.frames.is_empty() {
            bail!("Frame container has no frames");
        }
        let (term_w, term_h) = terminal::size()?;
        if term_w < MIN_WIDTH || term_h < MIN_HEIGHT {
            bail!(
                "Terminal too small: need {}x{}, have {}x{}",
                MIN_WIDTH,
                MIN_HEIGHT,
                term_w,
                term_h,
            );
        }

        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.run_loop(&mut stdout);

        // Always restore terminal state.
        let _ = execute!(stdout, style::ResetColor, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();

        result
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        self.render(stdout)?;
        let delay = Duration::from_millis(self.container.settings.frame_delay_ms);

        loop {
            if self.autoplay && !event::poll(delay)? {
                if self.current_frame + 1 < self.container.frames.len() {
                    self.current_frame += 1;
                } else {
                    self.autoplay = false;
                }
                self.render(stdout)?;
                continue;
            }

            match event::read()? {
                event::Event::Key(key) => {
                    use event::KeyCode::*;
                    let last = self.container.frames.len() - 1;
                    match key.code {
                        Char('q') | Esc => break,
                        Right | Char(' ') | Enter => {
                            self.current_frame = (self.current_frame + 1).min(last);
                        }
                        Left => self.current_frame = self.current_frame.saturating_sub(1),
                        Home => self.current_frame = 0,
                        End => self.current_frame = last,
                        Char('p') => self.autoplay = !self.autoplay,
                        _ => continue,
                    }
                    self.render(stdout)?;
                }
                event::Event::Resize(_, _) => self.render(stdout)?,
                _ => {}
            }
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    fn render(&self, stdout: &mut io::Stdout) -> Result<()> {
        let settings = &self.container.settings;
        let background = settings.background_rgb().map(rgb);
        if let Some(color) = background {
            queue!(stdout, style::SetBackgroundColor(color))?;
        }
        queue!(stdout, terminal::Clear(terminal::ClearType::All))?;
        self.render_menubar(stdout)?;

        let frame = &self.container.frames[self.current_frame];
        let led_color = settings.led_rgb().map(rgb);
        let mut lines = Vec::new();
        lines.push(Line::new(
            format!(" {} | {}", self.container.board, frame.timeline),
            style::Attribute::Bold,
        ));
        if settings.show_explanations {
            lines.push(Line::new(format!(" {}", frame.explanation), style::Attribute::Italic));
        }
        lines.push(Line::blank());
        for component in &frame.components {
            let mut line = Line::new(format!("  {}", describe(component)), style::Attribute::Reset);
            if matches!(component, ComponentState::Led(led) if led.is_on) {
                line.color = led_color;
            }
            lines.push(line);
            if settings.wire_labels {
                for wire in self.wiring.get(&component_id(component)).into_iter().flatten() {
                    lines.push(Line::new(
                        format!("      {:?} {} -> {}", wire.kind, wire.connection_id, wire.hole_id),
                        style::Attribute::Dim,
                    ));
                }
            }
        }
        if !frame.variables.is_empty() {
            lines.push(Line::blank());
            for variable in frame.variables.values() {
                lines.push(Line::new(
                    format!("  {} = {}", variable.name, variable.value),
                    style::Attribute::Reset,
                ));
            }
        }

        let (_, term_h) = terminal::size()?;
        let canvas_rows = term_h.saturating_sub(CANVAS_OFFSET + 1) as usize;
        for (y, line) in lines.iter().take(canvas_rows).enumerate() {
            queue!(
                stdout,
                cursor::MoveTo(0, y as u16 + CANVAS_OFFSET),
                style::SetAttribute(line.attribute),
            )?;
            if let Some(color) = line.color {
                queue!(stdout, style::SetForegroundColor(color))?;
            }
            queue!(
                stdout,
                style::Print(&line.text),
                style::SetAttribute(style::Attribute::Reset),
                style::ResetColor,
            )?;
            if let Some(color) = background {
                queue!(stdout, style::SetBackgroundColor(color))?;
            }
        }

        self.render_status(stdout, frame, term_h)?;
        stdout.flush()?;
        Ok(())
    }

    fn render_menubar(&self, stdout: &mut io::Stdout) -> Result<()> {
        let items: &[&str] = &[
            "[←] prev",
            "[→][Space] next",
            "[Home] first",
            "[End] last",
            "[p] play",
            "[q][Esc] quit",
        ];

        queue!(stdout, cursor::MoveTo(0, 0), style::Print(" "))?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                queue!(stdout, style::Print("  "))?;
            }
            print_key_hint(stdout, item)?;
        }
        Ok(())
    }

    fn render_status(&self, stdout: &mut io::Stdout, frame: &Frame, term_h: u16) -> Result<()> {
        let status = format!(
            " Frame {}/{} | block {}{}",
            self.current_frame + 1,
            self.container.frames.len(),
            frame.block_name,
            if self.autoplay { " | playing" } else { "" },
        );

        let mut cs = style::ContentStyle::default();
        cs.attributes.set(style::Attribute::Dim);

        queue!(
            stdout,
            cursor::MoveTo(0, term_h.saturating_sub(1)),
            style::PrintStyledContent(style::StyledContent::new(cs, status)),
        )?;
        Ok(())
    }
}

struct Line {
    text: String,
    attribute: style::Attribute,
    color: Option<style::Color>,
}

impl Line {
    fn new(text: String, attribute: style::Attribute) -> Self {
        Line {
            text,
            attribute,
            color: None,
        }
    }

    fn blank() -> Self {
        Line::new(String::new(), style::Attribute::Reset)
    }
}

fn rgb((r, g, b): (u8, u8, u8)) -> style::Color {
    style::Color::Rgb { r, g, b }
}

/// One-line description of a component's state.
pub fn describe(component: &ComponentState) -> String {
    match component {
        ComponentState::Led(led) => {
            let bulb = if led.is_on { '●' } else { '○' };
            let bar = "█".repeat(usize::from(led.fade) / 32);
            format!("{bulb} led pin {:<3} {:>3} {bar}", led.pin, led.fade)
        }
        ComponentState::UltrasonicSensor(s) => format!(
            "◎ ultrasonic trig {} echo {} | {} cm (marker y {})",
            s.trig_pin,
            s.echo_pin,
            s.cm,
            distance_marker_y(s.cm)
        ),
        ComponentState::Button(b) => format!(
            "▣ button pin {} {}",
            b.pin,
            if b.is_pressed { "pressed" } else { "released" }
        ),
        ComponentState::PhotoSensor(p) => format!("☼ photo sensor pin {} reading {}", p.pin, p.reading),
    }
}

/// Print a key hint, bolding any text inside `[...]` and dimming the rest.
fn print_key_hint(stdout: &mut io::Stdout, item: &str) -> Result<()> {
    for (i, part) in item.split(['[', ']']).enumerate() {
        if part.is_empty() {
            continue;
        }
        // Odd segments were inside brackets.
        let (attribute, text) = if i % 2 == 1 {
            (style::Attribute::Bold, format!("[{part}]"))
        } else {
            (style::Attribute::Dim, part.to_string())
        };
        queue!(
            stdout,
            style::SetAttribute(attribute),
            style::Print(text),
            style::SetAttribute(style::Attribute::Reset),
        )?;
    }
    Ok(())
}
