use std::sync::Mutex;

use assessment_domain::flow::QuestionView;
use assessment_domain::ports::navigation::{Destination, Navigator};
use assessment_domain::ports::notify::{Notifier, Severity};
use assessment_domain::questionnaire::QuestionKind;

pub const HELP: &str = "type an answer, or :prev  :next  :submit  :quit";

pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        println!("[{}] {message}", severity.as_str());
    }
}

/// Remembers where the flow sent the user; the prompt loop exits once set.
#[derive(Default)]
pub struct TerminalNavigator {
    destination: Mutex<Option<Destination>>,
}

impl TerminalNavigator {
    pub fn destination(&self) -> Option<Destination> {
        *self.destination.lock().expect("navigator lock")
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, destination: Destination) {
        println!("-> {}", destination.as_str());
        *self.destination.lock().expect("navigator lock") = Some(destination);
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Previous,
    Next,
    Submit,
    Quit,
    Answer(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            ":prev" | ":p" => Self::Previous,
            ":next" | ":n" => Self::Next,
            ":submit" | ":s" => Self::Submit,
            ":quit" | ":q" => Self::Quit,
            _ => Self::Answer(line.to_string()),
        }
    }
}

pub fn render(view: &QuestionView) -> String {
    let mut out = format!(
        "\nQuestion {} of {} ({} answered)\n{}\n",
        view.index + 1,
        view.count,
        view.answered,
        view.text
    );
    if !matches!(view.kind, QuestionKind::FreeText) {
        for (idx, option) in view.options.iter().enumerate() {
            out.push_str(&format!("  {}. {option}\n", idx + 1));
        }
    }
    if !view.response.is_empty() {
        out.push_str(&format!("current answer: {}\n", view.response));
    }
    out.push_str(if view.is_last {
        "(last question, :submit when ready)"
    } else {
        "(:next for the next question)"
    });
    out
}
