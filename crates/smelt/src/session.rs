use std::fmt;

use indexmap::IndexMap;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{
    fault::{Fault, FaultKind, RunResult},
    value::Value,
};

/// Registered configuration properties, keyed by camel-case name.
///
/// The name lookup is case-sensitive: `Sys.set ("lineWidth", ...)` works,
/// `"linewidth"` is an unknown property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum Prop {
    /// Whether the planner may hybridize in-memory and external relational
    /// evaluation.
    Hybrid,
    /// Number of inlining passes the frontend runs.
    InlinePassCount,
    /// Output line width used by the printer.
    LineWidth,
    /// Whether the frontend reports match coverage warnings as errors.
    MatchCoverageEnabled,
    /// Output mode name used by the printer.
    Output,
    /// Print depth cutoff.
    PrintDepth,
    /// Print length cutoff for collections.
    PrintLength,
    /// Print cutoff for long strings.
    StringDepth,
}

impl Prop {
    /// The value shape this property accepts.
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Hybrid | Self::MatchCoverageEnabled => matches!(value, Value::Bool(_)),
            Self::InlinePassCount | Self::LineWidth | Self::PrintDepth | Self::PrintLength | Self::StringDepth => {
                matches!(value, Value::Int(_))
            }
            Self::Output => matches!(value, Value::Str(_)),
        }
    }
}

/// Driver hook behind `Interact.use`: loads, compiles, and evaluates a source
/// file against the current session. The core never touches the filesystem
/// itself.
pub trait SourceDriver {
    fn run_file(&mut self, path: &str, silent: bool) -> Result<(), String>;
}

/// Process-wide session state, exactly one per evaluation.
///
/// Holds the configuration property map, the plan of the last evaluated Code,
/// and the driver hook used by `Interact.use`. Built-ins reach it through the
/// reserved environment binding; nothing else mutates it.
pub struct Session {
    props: IndexMap<Prop, Value>,
    plan: Option<String>,
    driver: Option<Box<dyn SourceDriver>>,
}

impl Session {
    pub fn new() -> Self {
        Self { props: IndexMap::new(), plan: None, driver: None }
    }

    /// Installs the driver hook used by `Interact.use`.
    pub fn set_driver(&mut self, driver: Box<dyn SourceDriver>) {
        self.driver = Some(driver);
    }

    fn prop(name: &str) -> RunResult<Prop> {
        name.parse()
            .map_err(|_| Fault::new_msg(FaultKind::Error, format!("unknown property \"{name}\"")).into())
    }

    /// Sets a property. Unknown names and wrong value shapes are faults.
    pub fn set_prop(&mut self, name: &str, value: Value) -> RunResult<()> {
        let prop = Self::prop(name)?;
        if !prop.accepts(&value) {
            return Err(Fault::new_msg(
                FaultKind::Error,
                format!("property \"{name}\" does not accept {}", value.type_name()),
            )
            .into());
        }
        self.props.insert(prop, value);
        Ok(())
    }

    /// The current value of a property, `None` when unset.
    pub fn show_prop(&self, name: &str) -> RunResult<Option<Value>> {
        let prop = Self::prop(name)?;
        Ok(self.props.get(&prop).cloned())
    }

    /// Removes a property value.
    pub fn unset_prop(&mut self, name: &str) -> RunResult<()> {
        let prop = Self::prop(name)?;
        self.props.shift_remove(&prop);
        Ok(())
    }

    /// Every registered property with its current value, in registration
    /// order.
    pub fn show_all(&self) -> Vec<(String, Option<Value>)> {
        Prop::iter()
            .map(|prop| (prop.to_string(), self.props.get(&prop).cloned()))
            .collect()
    }

    /// The properties that are currently set, in insertion order.
    pub fn env_entries(&self) -> Vec<(String, Value)> {
        self.props
            .iter()
            .map(|(prop, value)| (prop.to_string(), value.clone()))
            .collect()
    }

    /// Clears every property.
    pub fn clear_env(&mut self) {
        self.props.clear();
    }

    pub(crate) fn set_plan(&mut self, plan: String) {
        self.plan = Some(plan);
    }

    /// The structural description of the last evaluated Code.
    pub fn plan(&self) -> String {
        self.plan.clone().unwrap_or_default()
    }

    /// Loads and evaluates a source file through the driver hook.
    pub fn use_file(&mut self, path: &str, silent: bool) -> RunResult<()> {
        let Some(driver) = self.driver.as_mut() else {
            return Err(Fault::new_msg(FaultKind::Error, "no source driver installed").into());
        };
        driver
            .run_file(path, silent)
            .map_err(|message| Fault::new_msg(FaultKind::Error, message).into())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("props", &self.props)
            .field("plan", &self.plan)
            .field("driver", &self.driver.as_ref().map(|_| "<driver>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::RunError;

    #[test]
    fn set_show_unset_round_trip() {
        let mut session = Session::new();
        session.set_prop("lineWidth", Value::Int(120)).unwrap();
        assert_eq!(session.show_prop("lineWidth").unwrap(), Some(Value::Int(120)));
        session.unset_prop("lineWidth").unwrap();
        assert_eq!(session.show_prop("lineWidth").unwrap(), None);
    }

    #[test]
    fn unknown_property_is_an_error_fault() {
        let mut session = Session::new();
        let err = session.set_prop("lineWidt", Value::Int(1)).unwrap_err();
        match err {
            RunError::Fault(fault) => assert_eq!(fault.kind, FaultKind::Error),
            RunError::Assert(_) => panic!("expected a fault"),
        }
    }

    #[test]
    fn property_names_are_case_sensitive() {
        let session = Session::new();
        assert!(session.show_prop("linewidth").is_err());
        assert!(session.show_prop("lineWidth").is_ok());
    }

    #[test]
    fn property_values_are_shape_checked() {
        let mut session = Session::new();
        assert!(session.set_prop("hybrid", Value::Int(1)).is_err());
        assert!(session.set_prop("hybrid", Value::Bool(true)).is_ok());
    }

    #[test]
    fn clear_env_resets_the_map() {
        let mut session = Session::new();
        session.set_prop("printDepth", Value::Int(3)).unwrap();
        session.set_prop("output", Value::string("classic")).unwrap();
        assert_eq!(session.env_entries().len(), 2);
        session.clear_env();
        assert!(session.env_entries().is_empty());
        assert!(session.show_all().iter().all(|(_, value)| value.is_none()));
    }
}
