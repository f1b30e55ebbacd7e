use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::{JOB_DESCRIPTION_DATA_KEY, RESUME_DATA_KEY};

/// Every page the onboarding client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Landing,
    Chat,
    ResumeParser,
    JobDescriptionParser,
    Analysis,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Landing,
        Route::Chat,
        Route::ResumeParser,
        Route::JobDescriptionParser,
        Route::Analysis,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Chat => "/test",
            Route::ResumeParser => "/resume-parser",
            Route::JobDescriptionParser => "/job-description-parser",
            Route::Analysis => "/analysis",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    /// Fixed wizard order: resume, then job description, then analysis.
    pub fn next(&self) -> Option<Route> {
        match self {
            Route::Landing => Some(Route::ResumeParser),
            Route::ResumeParser => Some(Route::JobDescriptionParser),
            Route::JobDescriptionParser => Some(Route::Analysis),
            Route::Chat | Route::Analysis => None,
        }
    }

    /// Context key a step writes its handoff payload under.
    pub fn handoff_key(&self) -> Option<&'static str> {
        match self {
            Route::ResumeParser => Some(RESUME_DATA_KEY),
            Route::JobDescriptionParser => Some(JOB_DESCRIPTION_DATA_KEY),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Landing => "Start Onboarding",
            Route::Chat => "AI Assistant",
            Route::ResumeParser => "Step 1: Resume Analysis",
            Route::JobDescriptionParser => "Step 2: Job Description Analysis",
            Route::Analysis => "Analysis",
        }
    }
}

/// Records where the client is and where it has been. Navigation is
/// fire-and-forget: nothing is awaited from the destination.
#[derive(Debug, Clone)]
pub struct Navigator {
    current: Route,
    history: Vec<Route>,
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self {
            current: start,
            history: vec![start],
        }
    }

    pub fn current(&self) -> Route {
        self.current
    }

    pub fn history(&self) -> &[Route] {
        &self.history
    }

    pub fn navigate(&mut self, to: Route) {
        info!(from = self.current.path(), to = to.path(), "Navigating");
        self.current = to;
        self.history.push(to);
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Landing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/nowhere"), None);
    }

    #[test]
    fn test_wizard_order() {
        assert_eq!(Route::Landing.next(), Some(Route::ResumeParser));
        assert_eq!(Route::ResumeParser.next(), Some(Route::JobDescriptionParser));
        assert_eq!(Route::JobDescriptionParser.next(), Some(Route::Analysis));
        assert_eq!(Route::Analysis.next(), None);
        assert_eq!(Route::Chat.next(), None);
    }

    #[test]
    fn test_navigator_keeps_history() {
        let mut navigator = Navigator::default();
        navigator.navigate(Route::ResumeParser);
        navigator.navigate(Route::JobDescriptionParser);

        assert_eq!(navigator.current(), Route::JobDescriptionParser);
        assert_eq!(
            navigator.history(),
            &[Route::Landing, Route::ResumeParser, Route::JobDescriptionParser]
        );
    }
}
