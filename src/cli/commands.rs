use crate::filter::{SearchField, StatusFilter};
use crate::state::Action;

pub const HELP_TEXT: &str = "\
Commands:
  /TEXT, search TEXT     search the selected field (applied after a short pause)
  clear                  clear the search text
  field applicant|address
                         choose the searched field (clears the search text)
  status approved|requested|expired|all
                         filter by permit status
  next, n                next page
  prev, p                previous page
  page N                 jump to page N
  reload, r              fetch the dataset again from scratch
  help, h, ?             show this help
  quit, q                exit";

/// One line of interactive input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Action(Action),
    Help,
    Redraw,
}

fn required<'a>(arg: Option<&'a str>, what: &str) -> Result<&'a str, String> {
    arg.filter(|a| !a.is_empty())
        .ok_or_else(|| format!("missing {what}, type 'help' for usage"))
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(Command::Redraw);
    }
    let line = line.trim_start();
    // search text is taken verbatim, surrounding spaces included
    if let Some(text) = line.strip_prefix('/') {
        return Ok(Command::Action(Action::SetSearchText(text.to_string())));
    }

    let (verb, payload) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, Some(rest)),
        None => (line, None),
    };
    let arg = payload.map(str::trim);

    let action = match verb.to_lowercase().as_str() {
        "search" | "s" => Action::SetSearchText(payload.unwrap_or_default().to_string()),
        "clear" => Action::SetSearchText(String::new()),
        "field" | "f" => Action::SetSearchField(required(arg, "field")?.parse::<SearchField>()?),
        "status" => Action::SetStatus(required(arg, "status")?.parse::<StatusFilter>()?),
        "next" | "n" => Action::NextPage,
        "prev" | "previous" | "p" => Action::PreviousPage,
        "page" | "g" => {
            let raw = required(arg, "page number")?;
            let page = raw
                .parse::<usize>()
                .map_err(|_| format!("invalid page number '{raw}'"))?;
            Action::GoToPage(page)
        }
        "reload" | "r" => Action::Reload,
        "quit" | "q" | "exit" => Action::Quit,
        "help" | "h" | "?" => return Ok(Command::Help),
        other => return Err(format!("unknown command '{other}', type 'help' for usage")),
    };
    Ok(Command::Action(action))
}
