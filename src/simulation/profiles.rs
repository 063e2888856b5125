use super::scenarios::Scenario;
use super::{Archetype, BehaviorPattern, DeviceClass, DeviceProfile, NetworkClass, UserProfile};

/// Immutable catalogue of synthetic user archetypes, built once at startup.
pub struct ProfileRegistry {
    profiles: Vec<UserProfile>,
}

impl ProfileRegistry {
    /// The standard five-archetype catalogue used for canary runs.
    pub fn standard() -> Self {
        let profiles = vec![
            UserProfile {
                id: "power-user-01".to_string(),
                archetype: Archetype::Power,
                behavior: BehaviorPattern {
                    session_duration_ms: (600_000, 1_800_000),
                    actions_per_session: (40, 120),
                    think_time_ms: (300, 1_200),
                    error_tolerance: 0.2,
                    feature_adoption: 0.9,
                },
                device: DeviceProfile {
                    viewport: (2560, 1440),
                    network: NetworkClass::Fiber,
                    device: DeviceClass::Desktop,
                    touch: false,
                    screen_reader: false,
                },
                preferences: vec![
                    ("theme".to_string(), "dark".to_string()),
                    ("autoplay".to_string(), "on".to_string()),
                ],
                scenarios: vec![
                    Scenario::CreateContent,
                    Scenario::SearchDiscover,
                    Scenario::SettingsUpdate,
                ],
            },
            UserProfile {
                id: "casual-user-01".to_string(),
                archetype: Archetype::Casual,
                behavior: BehaviorPattern {
                    session_duration_ms: (120_000, 600_000),
                    actions_per_session: (5, 25),
                    think_time_ms: (1_500, 5_000),
                    error_tolerance: 0.6,
                    feature_adoption: 0.3,
                },
                device: DeviceProfile {
                    viewport: (1366, 768),
                    network: NetworkClass::Wifi,
                    device: DeviceClass::Laptop,
                    touch: false,
                    screen_reader: false,
                },
                preferences: vec![("theme".to_string(), "light".to_string())],
                scenarios: vec![Scenario::BrowseLibrary, Scenario::Playback],
            },
            UserProfile {
                id: "creator-01".to_string(),
                archetype: Archetype::Creator,
                behavior: BehaviorPattern {
                    session_duration_ms: (900_000, 3_600_000),
                    actions_per_session: (30, 80),
                    think_time_ms: (800, 3_000),
                    error_tolerance: 0.4,
                    feature_adoption: 0.8,
                },
                device: DeviceProfile {
                    viewport: (1920, 1080),
                    network: NetworkClass::Wifi,
                    device: DeviceClass::Desktop,
                    touch: false,
                    screen_reader: false,
                },
                preferences: vec![("editor".to_string(), "advanced".to_string())],
                scenarios: vec![
                    Scenario::SignupOnboarding,
                    Scenario::CreateContent,
                    Scenario::BrowseLibrary,
                ],
            },
            UserProfile {
                id: "mobile-user-01".to_string(),
                archetype: Archetype::Mobile,
                behavior: BehaviorPattern {
                    session_duration_ms: (60_000, 300_000),
                    actions_per_session: (3, 15),
                    think_time_ms: (1_000, 4_000),
                    error_tolerance: 0.5,
                    feature_adoption: 0.5,
                },
                device: DeviceProfile {
                    viewport: (390, 844),
                    network: NetworkClass::Cellular4g,
                    device: DeviceClass::Phone,
                    touch: true,
                    screen_reader: false,
                },
                preferences: vec![("data_saver".to_string(), "on".to_string())],
                scenarios: vec![Scenario::BrowseLibrary, Scenario::SearchDiscover],
            },
            UserProfile {
                id: "accessibility-user-01".to_string(),
                archetype: Archetype::Accessibility,
                behavior: BehaviorPattern {
                    session_duration_ms: (300_000, 900_000),
                    actions_per_session: (10, 40),
                    think_time_ms: (2_000, 6_000),
                    error_tolerance: 0.3,
                    feature_adoption: 0.4,
                },
                device: DeviceProfile {
                    viewport: (1920, 1080),
                    network: NetworkClass::Wifi,
                    device: DeviceClass::Desktop,
                    touch: false,
                    screen_reader: true,
                },
                preferences: vec![
                    ("reduced_motion".to_string(), "on".to_string()),
                    ("font_scale".to_string(), "1.5".to_string()),
                ],
                scenarios: vec![Scenario::SignupOnboarding, Scenario::SettingsUpdate],
            },
        ];

        ProfileRegistry { profiles }
    }

    pub fn profiles(&self) -> &[UserProfile] {
        &self.profiles
    }

    pub fn get(&self, id: &str) -> Option<&UserProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
