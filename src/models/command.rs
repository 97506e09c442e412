use crate::error::CommandError;

/// A single line of input to a job session, split on whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    List,
    Run(Vec<String>),
    Suspend(String),
    Resume(String),
    Terminate(String),
    Exit,
    Quit,
    Empty,
    Invalid(String),
}

impl SessionCommand {
    /// `max_args` bounds the arguments after the program name of `run`.
    pub fn parse(line: &str, max_args: usize) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Ok(SessionCommand::Empty);
        };
        let rest: Vec<String> = words.map(str::to_owned).collect();

        match first {
            "list" => Ok(SessionCommand::List),
            "run" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingProgram);
                }
                if rest.len() - 1 > max_args {
                    return Err(CommandError::TooManyArguments { max: max_args });
                }
                Ok(SessionCommand::Run(rest))
            }
            "suspend" => single_handle(rest, "suspend").map(SessionCommand::Suspend),
            "resume" => single_handle(rest, "resume").map(SessionCommand::Resume),
            "terminate" => single_handle(rest, "terminate").map(SessionCommand::Terminate),
            "exit" => Ok(SessionCommand::Exit),
            "quit" => Ok(SessionCommand::Quit),
            other => Ok(SessionCommand::Invalid(other.to_owned())),
        }
    }
}

fn single_handle(mut rest: Vec<String>, verb: &'static str) -> Result<String, CommandError> {
    if rest.len() != 1 {
        return Err(CommandError::Usage(verb));
    }
    Ok(rest.remove(0))
}
