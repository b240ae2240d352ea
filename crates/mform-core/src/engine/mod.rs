//! Runtime state machine for one form-filling session.
//!
//! A [`FormEngine`] is created per session with the submit/cancel callbacks
//! and default values, then every field of the form is registered with
//! [`FormEngine::add_field`]. The returned [`FieldHandle`] exposes the cells a
//! front end binds to: the value (two-way), its errors and its visibility.
//!
//! The session moves `draft -> submitted` or `draft -> cancelled`, and
//! nothing leaves either end state. A submit that fails validation reopens
//! the draft: the errors stay visible, the user can fix the values and
//! submit again, or cancel. Once either callback has fired, further
//! triggers are ignored.

mod cell;
mod state;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, info, info_span, warn, Span};
use uuid::Uuid;

use mform_domain::{FieldDefinition, FormData, FormDefinition};

use crate::condition::value_meets_condition;

pub use cell::{Derived, Subscription, ValueCell};
pub use state::{FieldRule, FieldState, FormState, FormStatus};

use cell::EngineCore;
use state::coerce_value;

/// `Ok(visible)`, or a description of a misconfigured condition.
pub type Visibility = Result<bool, String>;

type SubmitCallback = Box<dyn FnOnce(FormData)>;
type CancelCallback = Box<dyn FnOnce()>;

/// Construction parameters of a [`FormEngine`].
#[derive(Default)]
pub struct EngineOptions {
    on_submit: Option<SubmitCallback>,
    on_cancel: Option<CancelCallback>,
    default_values: FormData,
    form_name: Option<String>,
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_submit(mut self, callback: impl FnOnce(FormData) + 'static) -> Self {
        self.on_submit = Some(Box::new(callback));
        self
    }

    pub fn on_cancel(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_cancel = Some(Box::new(callback));
        self
    }

    pub fn default_values(mut self, values: FormData) -> Self {
        self.default_values = values;
        self
    }

    /// Name recorded on the session's tracing span.
    pub fn form_name(mut self, name: impl Into<String>) -> Self {
        self.form_name = Some(name.into());
        self
    }
}

/// Cells bound to one registered field.
#[derive(Clone)]
pub struct FieldHandle {
    pub definition: FieldDefinition,
    pub value: ValueCell,
    pub errors: Derived<Vec<String>>,
    pub is_visible: Derived<Visibility>,
}

impl FieldHandle {
    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

pub struct FormEngine {
    core: Rc<EngineCore>,
    on_submit: RefCell<Option<SubmitCallback>>,
    on_cancel: RefCell<Option<CancelCallback>>,
    defaults: FormData,
    closed: Cell<bool>,
    session_id: Uuid,
    span: Span,
}

impl FormEngine {
    pub fn new(options: EngineOptions) -> Self {
        let session_id = Uuid::new_v4();
        let form = options.form_name.unwrap_or_default();
        let span = info_span!("form_session", form = %form, session = %session_id);
        span.in_scope(|| debug!("form session opened"));
        Self {
            core: Rc::new(EngineCore::default()),
            on_submit: RefCell::new(options.on_submit),
            on_cancel: RefCell::new(options.on_cancel),
            defaults: options.default_values,
            closed: Cell::new(false),
            session_id,
            span,
        }
    }

    /// Engine with every field of `form` registered, in declared order.
    pub fn for_form(form: &FormDefinition, options: EngineOptions) -> (Self, Vec<FieldHandle>) {
        let options = if options.form_name.is_some() {
            options
        } else {
            options.form_name(form.name.clone())
        };
        let engine = Self::new(options);
        let handles = engine.add_fields(&form.fields);
        (engine, handles)
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Registers a field and returns its cells.
    ///
    /// The initial value comes from the default values, if any. Registering
    /// the same name twice replaces the earlier registration.
    pub fn add_field(&self, field: &FieldDefinition) -> FieldHandle {
        let _entered = self.span.enter();
        let kind = field.input.kind();
        let initial = self
            .defaults
            .get(&field.name)
            .cloned()
            .map(|value| coerce_value(kind, value));
        let rule = field
            .is_required()
            .then(|| FieldRule::required(field.label_or_name()));

        let replaced = self.core.mutate(|state| {
            state
                .fields
                .insert(
                    field.name.clone(),
                    FieldState {
                        value: initial,
                        rule,
                        errors: Vec::new(),
                    },
                )
                .is_some()
        });
        if replaced {
            warn!(field = %field.name, "field registered twice, keeping the latest definition");
        } else {
            debug!(field = %field.name, %kind, "registered field");
        }

        let errors_name = field.name.clone();
        let errors = Derived::new(Rc::clone(&self.core), move |state| {
            state.errors(&errors_name).to_vec()
        });
        let visible_field = field.clone();
        let is_visible = Derived::new(Rc::clone(&self.core), move |state| {
            visibility(&visible_field, state)
        });

        FieldHandle {
            definition: field.clone(),
            value: ValueCell::new(Rc::clone(&self.core), field.name.clone(), kind),
            errors,
            is_visible,
        }
    }

    pub fn add_fields(&self, fields: &[FieldDefinition]) -> Vec<FieldHandle> {
        fields.iter().map(|field| self.add_field(field)).collect()
    }

    /// Validates and, when every rule passes, hands the data to `on_submit`.
    ///
    /// Returns whether the submission went through.
    pub fn trigger_submit(&self) -> bool {
        let _entered = self.span.enter();
        if self.closed.get() {
            warn!("submit ignored, session already closed");
            return false;
        }

        let valid = self.core.mutate(|state| {
            let valid = state.validate();
            state.status = if valid {
                FormStatus::Submitted
            } else {
                FormStatus::Draft
            };
            valid
        });
        if !valid {
            let failing = self.core.read(|state| {
                state
                    .fields
                    .values()
                    .filter(|field| !field.errors.is_empty())
                    .count()
            });
            info!(failing, "submit blocked by validation");
            return false;
        }

        let data = self.core.read(FormState::data);
        self.closed.set(true);
        info!(fields = data.len(), "form submitted");
        let callback = self.on_submit.borrow_mut().take();
        if let Some(callback) = callback {
            callback(data);
        }
        true
    }

    /// Cancels the session and calls `on_cancel`. Never validates.
    pub fn trigger_cancel(&self) {
        let _entered = self.span.enter();
        if self.closed.get() {
            warn!("cancel ignored, session already closed");
            return;
        }
        self.core.mutate(|state| state.status = FormStatus::Cancelled);
        self.closed.set(true);
        info!("form cancelled");
        let callback = self.on_cancel.borrow_mut().take();
        if let Some(callback) = callback {
            callback();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    pub fn is_valid(&self) -> Derived<bool> {
        Derived::new(Rc::clone(&self.core), FormState::is_valid)
    }

    pub fn status(&self) -> Derived<FormStatus> {
        Derived::new(Rc::clone(&self.core), |state| state.status)
    }

    /// Current non-empty values, keyed by field name.
    pub fn values(&self) -> FormData {
        self.core.read(FormState::data)
    }

    pub fn state(&self) -> FormState {
        self.core.read(FormState::clone)
    }

    /// Calls `callback` with every new state after each mutation.
    pub fn subscribe(&self, callback: impl Fn(&FormState) + 'static) -> Subscription {
        self.core.subscribe(Rc::new(callback))
    }
}

fn visibility(field: &FieldDefinition, state: &FormState) -> Visibility {
    if field.input.is_hidden() {
        return Ok(false);
    }
    if field.is_required() {
        return Ok(true);
    }
    let Some(condition) = &field.condition else {
        return Ok(true);
    };
    match state.fields.get(&condition.dependency_name) {
        Some(dependency) => Ok(value_meets_condition(
            &condition.predicate,
            dependency.value.as_ref(),
        )),
        None => Err(format!(
            "Condition dependency '{}' not found for field '{}'",
            condition.dependency_name, field.name
        )),
    }
}
