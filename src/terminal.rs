//! ANSI rendering of the story view.

use narration_core::view::{PlaybackStatus, StoryView, WordSpan};
use narration_core::{Glossary, VocabularyEntry};
use std::io::{self, Write};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const UNDERLINE: &str = "\x1b[4m";
const HIGHLIGHT: &str = "\x1b[30;43m";
const ERROR: &str = "\x1b[31m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub struct TerminalRenderer<W: Write> {
    out: W,
    clear_between_frames: bool,
    header: String,
    header_drawn: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, clear_between_frames: bool) -> Self {
        Self {
            out,
            clear_between_frames,
            header: String::new(),
            header_drawn: false,
        }
    }

    /// Text kept above the story, e.g. the vocabulary panel. Redrawn after
    /// every screen clear; without clearing it is written once.
    pub fn with_header(mut self, header: String) -> Self {
        self.header = header;
        self
    }

    pub fn draw(&mut self, view: &StoryView) -> io::Result<()> {
        if self.clear_between_frames {
            self.out.write_all(CLEAR_SCREEN.as_bytes())?;
            self.header_drawn = false;
        }
        if !self.header_drawn {
            self.out.write_all(self.header.as_bytes())?;
            self.header_drawn = true;
        }
        self.out.write_all(render_frame(view).as_bytes())?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn render_frame(view: &StoryView) -> String {
    let mut frame = String::new();
    for paragraph in &view.paragraphs {
        for sentence in &paragraph.sentences {
            for word in &sentence.words {
                if !frame.is_empty() && !frame.ends_with('\n') {
                    frame.push(' ');
                }
                push_word(&mut frame, word, sentence.active);
            }
        }
        frame.push_str("\n\n");
    }
    frame.push_str(&status_line(view));
    frame.push('\n');
    frame
}

fn push_word(frame: &mut String, word: &WordSpan, sentence_active: bool) {
    let mut styled = false;
    if word.highlighted {
        frame.push_str(HIGHLIGHT);
        styled = true;
    } else if sentence_active {
        frame.push_str(BOLD);
        styled = true;
    }
    if word.vocabulary.is_some() {
        frame.push_str(UNDERLINE);
        styled = true;
    }
    frame.push_str(&word.text);
    if styled {
        frame.push_str(RESET);
    }
}

fn status_line(view: &StoryView) -> String {
    if let Some(error) = &view.error {
        return format!("{ERROR}! {error}{RESET}");
    }
    let label = match view.status {
        PlaybackStatus::Idle => "stopped",
        PlaybackStatus::Starting => "starting…",
        PlaybackStatus::Playing => "reading aloud",
    };
    match view.active_sentence {
        Some(idx) => format!("{DIM}[{label}, sentence {}]{RESET}", idx + 1),
        None => format!("{DIM}[{label}]{RESET}"),
    }
}

/// Word list with definitions, shown before narration starts.
pub fn render_vocabulary_panel(words: &[String], glossary: &Glossary) -> String {
    if words.is_empty() {
        return String::new();
    }
    let mut panel = format!("{BOLD}Vocabulary{RESET}\n");
    for word in words {
        match glossary.lookup(word) {
            Some(entry) => panel.push_str(&describe_entry(word, entry)),
            None => panel.push_str(&format!("  {UNDERLINE}{word}{RESET}\n")),
        }
    }
    panel.push('\n');
    panel
}

fn describe_entry(word: &str, entry: &VocabularyEntry) -> String {
    let mut text = format!("  {UNDERLINE}{word}{RESET}");
    if !entry.pronunciation.is_empty() {
        text.push_str(&format!(" ({})", entry.pronunciation));
    }
    if !entry.simple_definition.is_empty() {
        text.push_str(&format!(": {}", entry.simple_definition));
    }
    text.push('\n');
    if !entry.example_sentence.is_empty() {
        text.push_str(&format!("    {DIM}\"{}\"{RESET}\n", entry.example_sentence));
    }
    if !entry.synonyms.is_empty() {
        text.push_str(&format!("    {DIM}also: {}{RESET}\n", entry.synonyms.join(", ")));
    }
    text
}
