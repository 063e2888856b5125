use serde::{Deserialize, Serialize};

/// The fixed scenario catalogue. Closed enum so step dispatch stays
/// exhaustive; adding a scenario forces every match to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    SignupOnboarding,
    CreateContent,
    BrowseLibrary,
    SearchDiscover,
    Playback,
    SettingsUpdate,
}

impl Scenario {
    pub fn tag(&self) -> &'static str {
        match self {
            Scenario::SignupOnboarding => "signup-onboarding",
            Scenario::CreateContent => "create-content",
            Scenario::BrowseLibrary => "browse-library",
            Scenario::SearchDiscover => "search-discover",
            Scenario::Playback => "playback",
            Scenario::SettingsUpdate => "settings-update",
        }
    }

    /// Fixed step sequence for this scenario.
    pub fn steps(&self) -> &'static [Step] {
        match self {
            Scenario::SignupOnboarding => SIGNUP_ONBOARDING_STEPS,
            Scenario::CreateContent => CREATE_CONTENT_STEPS,
            Scenario::BrowseLibrary => BROWSE_LIBRARY_STEPS,
            Scenario::SearchDiscover => SEARCH_DISCOVER_STEPS,
            Scenario::Playback => PLAYBACK_STEPS,
            Scenario::SettingsUpdate => SETTINGS_UPDATE_STEPS,
        }
    }
}

const SIGNUP_ONBOARDING_STEPS: &[Step] = &[
    Step::action("open-signup", StepAction::Navigate("/signup")),
    Step::action("fill-account-form", StepAction::Type("account-form")),
    Step::action("submit-signup", StepAction::Click("signup-submit")),
    Step::action("pick-interests", StepAction::Click("interest-grid")),
    Step::action("verify-dashboard", StepAction::Assert("dashboard-root")),
];

const CREATE_CONTENT_STEPS: &[Step] = &[
    Step::action("open-editor", StepAction::Navigate("/create")),
    Step::action("enter-title", StepAction::Type("title-field")),
    Step::action("enter-body", StepAction::Type("body-editor")),
    Step::action("request-generation", StepAction::Click("generate-button")),
    Step::wait("wait-generation", StepAction::PollCompletion("generation-job")),
    Step::action("publish", StepAction::Click("publish-button")),
    Step::action("verify-published", StepAction::Assert("published-banner")),
];

const BROWSE_LIBRARY_STEPS: &[Step] = &[
    Step::action("open-library", StepAction::Navigate("/library")),
    Step::action("scroll-feed", StepAction::Click("load-more")),
    Step::action("open-item", StepAction::Click("library-card")),
    Step::action("verify-detail", StepAction::Assert("item-detail")),
];

const SEARCH_DISCOVER_STEPS: &[Step] = &[
    Step::action("open-search", StepAction::Navigate("/search")),
    Step::action("enter-query", StepAction::Type("search-box")),
    Step::action("run-search", StepAction::Click("search-submit")),
    Step::action("verify-results", StepAction::Assert("result-list")),
    Step::action("open-result", StepAction::Click("result-row")),
];

const PLAYBACK_STEPS: &[Step] = &[
    Step::action("open-item", StepAction::Navigate("/library/featured")),
    Step::action("start-playback", StepAction::Click("play-button")),
    Step::wait("wait-buffering", StepAction::PollCompletion("player-ready")),
    Step::action("seek", StepAction::Click("seek-bar")),
    Step::action("verify-playing", StepAction::Assert("player-playing")),
];

const SETTINGS_UPDATE_STEPS: &[Step] = &[
    Step::action("open-settings", StepAction::Navigate("/settings")),
    Step::action("toggle-preference", StepAction::Click("autoplay-toggle")),
    Step::action("save", StepAction::Click("save-settings")),
    Step::action("verify-saved", StepAction::Assert("saved-toast")),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Navigate(&'static str),
    Click(&'static str),
    Type(&'static str),
    Assert(&'static str),
    /// Bounded wait for a server-side job; the executor polls this until the
    /// ceiling and records a timeout error if it never completes.
    PollCompletion(&'static str),
}

impl StepAction {
    pub fn target(&self) -> &'static str {
        match self {
            StepAction::Navigate(t)
            | StepAction::Click(t)
            | StepAction::Type(t)
            | StepAction::Assert(t)
            | StepAction::PollCompletion(t) => t,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub name: &'static str,
    pub action: StepAction,
    /// Wait steps are terminal on timeout: the ceiling is enforced by the
    /// executor rather than the driver.
    pub bounded_wait: bool,
}

impl Step {
    pub const fn action(name: &'static str, action: StepAction) -> Self {
        Step {
            name,
            action,
            bounded_wait: false,
        }
    }

    pub const fn wait(name: &'static str, action: StepAction) -> Self {
        Step {
            name,
            action,
            bounded_wait: true,
        }
    }
}
