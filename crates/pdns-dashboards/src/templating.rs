// Numan Thabit 2025
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
};

use crate::{
    error::DashboardError,
    model::{ChoiceOption, CustomVariable, QueryVariable, Selection},
};

/// Template variable whose options are listed by a backend query.
#[derive(Debug, Clone)]
pub struct QueryVar {
    name: String,
    label: String,
    query: String,
    regex: String,
    multi: bool,
    include_all: bool,
}

impl QueryVar {
    pub fn new(name: impl Into<String>, label: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            query: query.into(),
            regex: String::new(),
            multi: false,
            include_all: false,
        }
    }

    /// Filter applied to the options returned by the query.
    pub fn regex(mut self, regex: impl Into<String>) -> Self {
        self.regex = regex.into();
        self
    }

    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub fn include_all(mut self, include_all: bool) -> Self {
        self.include_all = include_all;
        self
    }

    pub(crate) fn into_variable(self, datasource: &str) -> QueryVariable {
        QueryVariable {
            current: BTreeMap::new(),
            datasource: datasource.to_string(),
            hide: 0,
            include_all: self.include_all,
            label: self.label,
            multi: self.multi,
            name: self.name,
            options: Vec::new(),
            query: self.query,
            refresh: 1,
            regex: self.regex,
        }
    }
}

/// Template variable with a fixed, ordered list of options.
///
/// Options are turned into text once, here; the default is matched against
/// that text when the variable is added to a dashboard.
#[derive(Debug, Clone)]
pub struct ChoiceVar {
    name: String,
    label: String,
    options: Vec<String>,
    default: Option<String>,
    multi: bool,
    include_all: bool,
}

impl ChoiceVar {
    pub fn new<I>(name: impl Into<String>, label: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        Self {
            name: name.into(),
            label: label.into(),
            options: options.into_iter().map(|opt| opt.to_string()).collect(),
            default: None,
            multi: false,
            include_all: false,
        }
    }

    /// Selected option; the first option is used when unset.
    pub fn default_value(mut self, value: impl Display) -> Self {
        self.default = Some(value.to_string());
        self
    }

    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub fn include_all(mut self, include_all: bool) -> Self {
        self.include_all = include_all;
        self
    }

    pub(crate) fn into_variable(self) -> Result<CustomVariable, DashboardError> {
        let Some(first) = self.options.first() else {
            return Err(DashboardError::EmptyOptions { name: self.name });
        };
        let mut seen = BTreeSet::new();
        if let Some(dup) = self.options.iter().find(|opt| !seen.insert(opt.as_str())) {
            return Err(DashboardError::DuplicateOption {
                option: dup.clone(),
                name: self.name,
            });
        }
        let default = self.default.unwrap_or_else(|| first.clone());
        if !self.options.contains(&default) {
            return Err(DashboardError::DefaultNotInOptions {
                name: self.name,
                default,
            });
        }

        let query = self.options.join(", ");
        let options = self
            .options
            .into_iter()
            .map(|opt| ChoiceOption {
                selected: opt == default,
                text: opt.clone(),
                value: opt,
            })
            .collect();

        Ok(CustomVariable {
            current: Selection {
                text: default.clone(),
                value: default,
            },
            datasource: None,
            hide: 0,
            include_all: self.include_all,
            label: self.label,
            multi: self.multi,
            name: self.name,
            options,
            query,
            refresh: 0,
        })
    }
}
