//! Scripted test doubles for the directory capability traits.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use dirlook_core::entry::DirectoryEntry;
use dirlook_core::error::{LookupError, LookupResult};
use dirlook_core::request::{Credentials, Protocol, ServerTarget};
use dirlook_core::traits::{DirectoryConnector, DirectorySearch};

/// One recorded call to [`DirectorySearch::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSearch {
    pub base: Option<String>,
    pub filter: String,
    pub attributes: Option<Vec<String>>,
}

/// A search session that replays scripted responses in order and
/// records every call it receives.
pub struct ScriptedSession {
    responses: Mutex<VecDeque<LookupResult<Vec<DirectoryEntry>>>>,
    calls: Mutex<Vec<RecordedSearch>>,
}

impl ScriptedSession {
    pub fn new(responses: Vec<LookupResult<Vec<DirectoryEntry>>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedSearch> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectorySearch for ScriptedSession {
    async fn search(
        &self,
        base: Option<&str>,
        filter: &str,
        attributes: Option<&[String]>,
    ) -> LookupResult<Vec<DirectoryEntry>> {
        self.calls.lock().unwrap().push(RecordedSearch {
            base: base.map(str::to_string),
            filter: filter.to_string(),
            attributes: attributes.map(<[String]>::to_vec),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LookupError::search_failed("scripted responses exhausted")))
    }
}

/// One recorded call to [`DirectoryConnector::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedOpen {
    pub host: String,
    pub port: Option<u16>,
    pub protocol: Protocol,
    pub authenticated: bool,
}

/// A connector that hands out a shared scripted session and records
/// where each session was opened.
pub struct ScriptedConnector {
    session: Arc<ScriptedSession>,
    opens: Mutex<Vec<RecordedOpen>>,
}

impl ScriptedConnector {
    pub fn new(responses: Vec<LookupResult<Vec<DirectoryEntry>>>) -> Self {
        Self {
            session: Arc::new(ScriptedSession::new(responses)),
            opens: Mutex::new(Vec::new()),
        }
    }

    pub fn opens(&self) -> Vec<RecordedOpen> {
        self.opens.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<RecordedSearch> {
        self.session.calls()
    }
}

impl DirectoryConnector for ScriptedConnector {
    type Session = Arc<ScriptedSession>;

    fn open(
        &self,
        server: &ServerTarget,
        protocol: Protocol,
        credentials: Option<&Credentials>,
    ) -> LookupResult<Self::Session> {
        self.opens.lock().unwrap().push(RecordedOpen {
            host: server.host.clone(),
            port: server.port,
            protocol,
            authenticated: credentials.is_some(),
        });
        Ok(Arc::clone(&self.session))
    }
}
