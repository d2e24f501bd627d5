use configs::{ReadFailureSetting, ResourceSettings};
use serde::Serialize;

/// Reaction to a backing file that cannot be re-read before an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadFailurePolicy {
    /// Log and keep working on the last successfully loaded collection.
    ServeStale,
    /// Surface the failure to the caller.
    Fail,
}

impl From<ReadFailureSetting> for ReadFailurePolicy {
    fn from(s: ReadFailureSetting) -> Self {
        match s {
            ReadFailureSetting::ServeStale => Self::ServeStale,
            ReadFailureSetting::Fail => Self::Fail,
        }
    }
}

/// Everything that distinguishes one collection from another.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResourceConfig {
    /// URL path segment, e.g. `student`.
    pub name: String,
    /// File name inside the data directory.
    pub file: String,
    /// Documented field set; records are not restricted to it.
    pub fields: Vec<String>,
    /// Fields that must be present on create. Empty disables validation.
    pub required: Vec<String>,
    /// Text fields covered by the name search.
    pub search_fields: Vec<String>,
    /// Field holding the timestamp used by date-range lookups.
    pub date_field: Option<String>,
    /// Stretch a date-only upper bound to 23:59:59.999 of that day.
    pub end_of_day_upper_bound: bool,
    pub read_failure: ReadFailurePolicy,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl ResourceConfig {
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            fields: Vec::new(),
            required: Vec::new(),
            search_fields: Vec::new(),
            date_field: None,
            end_of_day_upper_bound: false,
            read_failure: ReadFailurePolicy::ServeStale,
        }
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = owned(fields);
        self
    }

    pub fn with_required(mut self, fields: &[&str]) -> Self {
        self.required = owned(fields);
        self
    }

    pub fn with_search_fields(mut self, fields: &[&str]) -> Self {
        self.search_fields = owned(fields);
        self
    }

    pub fn with_date_field(mut self, field: &str, end_of_day_upper_bound: bool) -> Self {
        self.date_field = Some(field.to_string());
        self.end_of_day_upper_bound = end_of_day_upper_bound;
        self
    }

    pub fn with_read_failure(mut self, policy: ReadFailurePolicy) -> Self {
        self.read_failure = policy;
        self
    }

    pub fn validates_on_create(&self) -> bool {
        !self.required.is_empty()
    }

    /// New resource declared purely from settings; file defaults to `<name>.json`.
    pub fn from_settings(settings: &ResourceSettings) -> Self {
        let name = settings.name.trim();
        let mut cfg = Self::new(name, format!("{name}.json"));
        cfg.apply(settings);
        cfg
    }

    /// Overlay the set fields of `settings` onto this configuration.
    pub fn apply(&mut self, settings: &ResourceSettings) {
        if let Some(file) = &settings.file {
            self.file = file.clone();
        }
        if let Some(fields) = &settings.fields {
            self.fields = fields.clone();
        }
        if let Some(required) = &settings.required {
            self.required = required.clone();
        }
        if let Some(search) = &settings.search_fields {
            self.search_fields = search.clone();
        }
        if let Some(date_field) = &settings.date_field {
            self.date_field = if date_field.trim().is_empty() { None } else { Some(date_field.clone()) };
        }
        if let Some(eod) = settings.end_of_day_upper_bound {
            self.end_of_day_upper_bound = eod;
        }
        if let Some(policy) = settings.read_failure {
            self.read_failure = policy.into();
        }
    }
}

/// The six collections served out of the box.
pub fn builtin_resources() -> Vec<ResourceConfig> {
    vec![
        ResourceConfig::new("appoint", "appointments.json")
            .with_fields(&["specialty", "comments", "date", "student", "professional"])
            .with_required(&["specialty", "date", "student", "professional"])
            .with_search_fields(&["student", "professional"])
            .with_date_field("date", true),
        ResourceConfig::new("event", "events.json")
            .with_fields(&["description", "comments", "date"])
            .with_required(&["description", "date"])
            .with_date_field("date", false),
        ResourceConfig::new("prof", "professionals.json")
            .with_fields(&["name", "specialty", "contact", "phone_number", "status"])
            .with_search_fields(&["name"]),
        ResourceConfig::new("student", "students.json")
            .with_fields(&["name", "age", "parents", "phone_number", "special_needs", "status"])
            .with_required(&["name"])
            .with_search_fields(&["name"]),
        ResourceConfig::new("teacher", "teachers.json")
            .with_fields(&["name", "school_disciplines", "contact", "phone_number", "status"])
            .with_search_fields(&["name"]),
        ResourceConfig::new("user", "users.json")
            .with_fields(&["name", "email", "age", "address"])
            .with_required(&["name", "email"])
            .with_search_fields(&["name"]),
    ]
}

/// Builtins with `overrides` applied by name; unknown names are appended as new resources.
pub fn resolve_resources(overrides: &[ResourceSettings]) -> Vec<ResourceConfig> {
    let mut resources = builtin_resources();
    for settings in overrides {
        let name = settings.name.trim();
        match resources.iter_mut().find(|r| r.name == name) {
            Some(existing) => existing.apply(settings),
            None => resources.push(ResourceConfig::from_settings(settings)),
        }
    }
    resources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_have_unique_names_and_files() {
        let all = builtin_resources();
        assert_eq!(all.len(), 6);
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.name, b.name);
                assert_ne!(a.file, b.file);
            }
        }
        let appoint = all.iter().find(|r| r.name == "appoint").unwrap();
        assert!(appoint.end_of_day_upper_bound);
        let event = all.iter().find(|r| r.name == "event").unwrap();
        assert!(!event.end_of_day_upper_bound);
        assert!(!all.iter().find(|r| r.name == "prof").unwrap().validates_on_create());
    }

    #[test]
    fn overrides_apply_by_name_and_declare_new_resources() {
        let overrides = vec![
            ResourceSettings {
                name: "teacher".into(),
                fields: Some(vec!["specialty".into(), "date".into(), "student".into(), "professional".into()]),
                search_fields: Some(vec!["student".into(), "professional".into()]),
                date_field: Some("date".into()),
                end_of_day_upper_bound: Some(true),
                read_failure: Some(ReadFailureSetting::Fail),
                ..Default::default()
            },
            ResourceSettings { name: " room ".into(), required: Some(vec!["label".into()]), ..Default::default() },
        ];
        let all = resolve_resources(&overrides);
        assert_eq!(all.len(), 7);

        let teacher = all.iter().find(|r| r.name == "teacher").unwrap();
        assert_eq!(teacher.file, "teachers.json");
        assert_eq!(teacher.date_field.as_deref(), Some("date"));
        assert_eq!(teacher.search_fields, vec!["student", "professional"]);
        assert_eq!(teacher.read_failure, ReadFailurePolicy::Fail);

        let room = all.iter().find(|r| r.name == "room").unwrap();
        assert_eq!(room.file, "room.json");
        assert!(room.validates_on_create());
        assert!(room.date_field.is_none());
    }
}
