//! Port fakes for provider tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use workbench_application::{
    CommandOutput, CommandSpec, HttpClientPort, HttpError, HttpRequestSpec, HttpResponse,
    ProcessError, ProcessRunnerPort, RunOptions,
};

/// Scripted process runner that records every command it is asked to run.
///
/// Follow-mode commands are refused the same way the real runner refuses
/// them. Otherwise responses are consumed in order; once exhausted, runs
/// succeed with empty output.
pub struct FakeRunner {
    responses: Mutex<VecDeque<Result<CommandOutput, ProcessError>>>,
    calls: Mutex<Vec<(CommandSpec, RunOptions)>>,
    missing: Vec<String>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            missing: Vec::new(),
        }
    }

    pub fn with_stdout(self, stdout: &str) -> Self {
        self.with_output(CommandOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: Some(0),
        })
    }

    pub fn with_exit(self, code: i32, stdout: &str, stderr: &str) -> Self {
        self.with_output(CommandOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code: Some(code),
        })
    }

    pub fn with_output(self, output: CommandOutput) -> Self {
        self.responses.lock().unwrap().push_back(Ok(output));
        self
    }

    pub fn with_error(self, error: ProcessError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Report `program` as not installed
    pub fn without(mut self, program: &str) -> Self {
        self.missing.push(program.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(CommandSpec, RunOptions)> {
        self.calls.lock().unwrap().clone()
    }

    /// Argument vectors of every recorded call
    pub fn argvs(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .map(|(spec, _)| {
                std::iter::once(spec.program)
                    .chain(spec.args)
                    .collect()
            })
            .collect()
    }
}

#[async_trait]
impl ProcessRunnerPort for FakeRunner {
    async fn run(
        &self,
        command: &CommandSpec,
        options: &RunOptions,
    ) -> Result<CommandOutput, ProcessError> {
        self.calls
            .lock()
            .unwrap()
            .push((command.clone(), options.clone()));
        if command.is_follow_mode() && !options.allow_follow {
            return Err(ProcessError::FollowRejected(command.to_string()));
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(CommandOutput {
                exit_code: Some(0),
                ..CommandOutput::default()
            }))
    }

    fn is_installed(&self, program: &str) -> bool {
        !self.missing.iter().any(|m| m == program)
    }
}

/// Scripted HTTP client that records every request
pub struct FakeHttp {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequestSpec>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(self, response: HttpResponse) -> Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn with_error(self, error: HttpError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequestSpec> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClientPort for FakeHttp {
    async fn send(&self, request: &HttpRequestSpec) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::InvalidRequest("no scripted response".into())))
    }
}
