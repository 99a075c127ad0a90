//! The terminal-backed capability table.

use std::{rc::Rc, time::Duration};

use greyscript_lang::{
    Error, HandleInner, HostObject, Interpreter, RuntimeErrorKind, Signal, Value, ValueType,
    objects::{CallbackReturn, Handle},
};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader, Lines},
    sync::Mutex,
};

/// Longest pause `wait` accepts, in seconds.
const MAX_WAIT: f64 = 300.0;

/// The lines of standard input, shared by every `user_input` call of the
/// process so that buffered lines survive between calls and sessions.
#[derive(Clone)]
pub struct Input(Rc<Mutex<Lines<BufReader<Box<dyn AsyncRead + Unpin>>>>>);

impl Input {
    pub fn stdin() -> Self {
        Input::from_reader(tokio::io::stdin())
    }

    pub fn from_reader(reader: impl AsyncRead + Unpin + 'static) -> Self {
        let reader: Box<dyn AsyncRead + Unpin> = Box::new(reader);
        Input(Rc::new(Mutex::new(BufReader::new(reader).lines())))
    }

    /// The next line without its terminator, or an empty string at end of
    /// input.
    pub async fn next_line(&self) -> Result<String, Error> {
        let line = self.0.lock().await.next_line().await.map_err(io_error)?;
        Ok(line.unwrap_or_default())
    }
}

pub fn install(interpreter: &Interpreter, input: &Input) {
    interpreter.register_callback("print", |args| {
        let text = args.first().map(Value::to_string).unwrap_or_default();
        println!("{text}");
        Ok(Value::Nil)
    });
    let input = input.clone();
    interpreter.register_async("user_input", move |args: Vec<Value>| {
        let input = input.clone();
        async move {
            let prompt = args.first().map(Value::to_string).unwrap_or_default();
            let mut stdout = tokio::io::stdout();
            stdout.write_all(prompt.as_bytes()).await.map_err(io_error)?;
            stdout.flush().await.map_err(io_error)?;
            let line = input.next_line().await?;
            Ok(Value::from(line.trim_end_matches('\r')))
        }
    });
    interpreter.register_async("wait", |args: Vec<Value>| async move {
        let seconds = args.first().and_then(Value::to_number).unwrap_or(1.0);
        let seconds = if seconds.is_finite() {
            seconds.clamp(0.0, MAX_WAIT)
        } else {
            0.0
        };
        tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
        Ok(Value::Nil)
    });
    interpreter.register_callback("launch", |args| {
        let path = args.first().map(Value::to_string).unwrap_or_default();
        if path.is_empty() {
            return Err(Error::host("launch: missing program path"));
        }
        let params = match args.get(1) {
            Some(Value::List(list)) => list.snapshot(),
            Some(Value::Nil) | None => Vec::new(),
            Some(v) => vec![v.clone()],
        };
        let session = Session { path, params };
        Err(Signal::NewShell(Rc::new(HandleInner::new(session))).into())
    });
}

fn io_error(e: std::io::Error) -> Error {
    Error::host(e.to_string())
}

/// A program the CLI must run after the current one yields.
#[derive(Debug, Clone)]
pub struct Session {
    pub path: String,
    pub params: Vec<Value>,
}

impl Session {
    pub fn from_handle(handle: &Handle) -> Result<Session, anyhow::Error> {
        let path = handle
            .get("path")
            .ok_or_else(|| anyhow::anyhow!("{handle} is not a shell session"))?
            .to_string();
        let params = match handle.get("params") {
            Some(Value::List(list)) => list.snapshot(),
            _ => Vec::new(),
        };
        Ok(Session { path, params })
    }
}

impl HostObject for Session {
    fn type_name(&self) -> &str {
        "shell"
    }

    fn call_method(&self, name: &str, _args: Vec<Value>) -> Result<CallbackReturn, Error> {
        Err(RuntimeErrorKind::MethodNotFound {
            value_type: ValueType::Handle,
            method: name.into(),
        }
        .into())
    }

    fn get(&self, name: &str) -> Option<Value> {
        match name {
            "path" => Some(Value::from(self.path.as_str())),
            "params" => Some(Value::from(self.params.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use greyscript_lang::Completion;

    use super::*;

    #[tokio::test]
    async fn test_user_input_keeps_buffered_lines() {
        let input = Input::from_reader(&b"first\nsecond\r\n"[..]);
        let interpreter = Interpreter::new();
        install(&interpreter, &input);
        let completion = interpreter
            .run_source(
                "a = user_input(\"\")\nb = user_input(\"\")\nc = user_input(\"\")\nreturn [a, b, c]",
                Vec::new(),
            )
            .await
            .unwrap();
        match completion {
            Completion::Done(value) => assert_eq!(value.to_string(), "[\"first\", \"second\", \"\"]"),
            other => panic!("unexpected completion {other:?}"),
        }
    }
}
