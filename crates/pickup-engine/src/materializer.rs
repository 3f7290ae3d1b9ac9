//! Schedule materialization -- turns a request's occurrences into schedule
//! records and persists them as one recurring group.
//!
//! The first occurrence becomes the parent. It is inserted on its own so the
//! backend can assign its id; every later occurrence becomes a child carrying
//! that id and is inserted in a single batch afterwards. The two calls are
//! sequential and never overlap.
//!
//! If the child batch fails, the parent stays behind. No compensating delete
//! is attempted: the error names the orphaned parent and the caller decides
//! whether to remove it or call [`retry_children`].

use tracing::{debug, warn};

use crate::error::{PersistenceError, Result, ScheduleError};
use crate::ids::{ScheduleId, UserId};
use crate::policy::SchedulingPolicy;
use crate::recurrence::{expand_request, Occurrence};
use crate::record::{NewScheduleRecord, ScheduleStatus};
use crate::request::ScheduleRequest;
use crate::session::{Capability, Session};
use crate::store::ScheduleStore;
use crate::target::TargetScope;

/// Unsaved records for one request: the parent plus its children.
///
/// Children carry no `parent_schedule_id` until the parent has been stored.
/// For a non-recurring request the parent is a standalone record with
/// `is_recurring_parent = false` and no children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulePlan {
    pub parent: NewScheduleRecord,
    pub children: Vec<NewScheduleRecord>,
}

impl SchedulePlan {
    pub fn len(&self) -> usize {
        1 + self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Children with their parent link filled in.
    pub fn linked_children(&self, parent_id: ScheduleId) -> Vec<NewScheduleRecord> {
        self.children
            .iter()
            .cloned()
            .map(|mut child| {
                child.parent_schedule_id = Some(parent_id);
                child
            })
            .collect()
    }
}

/// A group that was written in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedGroup {
    pub parent_id: ScheduleId,
    pub parent: NewScheduleRecord,
    pub children: Vec<NewScheduleRecord>,
}

impl MaterializedGroup {
    pub fn len(&self) -> usize {
        1 + self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Parent first, then children in date order.
    pub fn records(&self) -> impl Iterator<Item = &NewScheduleRecord> {
        std::iter::once(&self.parent).chain(self.children.iter())
    }
}

/// Validate and expand `request` into unsaved records.
///
/// # Errors
/// `ScheduleError::Validation` for a malformed request, `ScheduleError::EmptyResult`
/// if no day qualifies.
pub fn plan(
    request: &ScheduleRequest,
    policy: &SchedulingPolicy,
    created_by: UserId,
) -> Result<SchedulePlan> {
    let scope = request.validate(policy)?;
    build_plan(request, scope, created_by)
}

fn build_plan(
    request: &ScheduleRequest,
    scope: TargetScope,
    created_by: UserId,
) -> Result<SchedulePlan> {
    let occurrences = expand_request(request)?;
    debug!(
        target_type = %scope.target_type(),
        recurrence = %request.recurrence_type,
        occurrences = occurrences.len(),
        "expanded schedule request"
    );

    let recurring = request.recurrence_type.is_recurring();
    let notes = request.trimmed_notes().map(str::to_string);
    let template = |occ: &Occurrence| NewScheduleRecord {
        target: scope.clone(),
        scheduled_date: occ.date,
        time_window: occ.window,
        status: ScheduleStatus::Scheduled,
        notes: notes.clone(),
        created_by,
        recurrence_type: request.recurrence_type,
        recurrence_days: (recurring && !request.recurrence_days.is_empty())
            .then_some(request.recurrence_days),
        recurrence_end_date: if recurring { request.end_date } else { None },
        is_recurring_parent: false,
        parent_schedule_id: None,
    };

    let mut records = occurrences.iter().map(template);
    let Some(mut parent) = records.next() else {
        // expand_request never returns an empty Ok.
        return Err(ScheduleError::EmptyResult {
            recurrence: request.recurrence_type,
            start: request.start_date,
            end: request.end_date.unwrap_or(request.start_date),
        });
    };
    parent.is_recurring_parent = recurring;

    Ok(SchedulePlan {
        parent,
        children: records.collect(),
    })
}

/// Validate, authorize, expand, and persist `request` on behalf of `session`.
///
/// # Errors
/// - `ScheduleError::Validation` / `EmptyResult` -- nothing was written.
/// - `ScheduleError::Unauthorized` -- the session cannot create schedules for the target.
/// - `PersistenceError::ParentInsert` -- nothing was written.
/// - `PersistenceError::ChildInsert` -- the parent was written, the children were not.
pub async fn materialize<S: ScheduleStore>(
    store: &S,
    session: &Session,
    request: &ScheduleRequest,
    policy: &SchedulingPolicy,
) -> Result<MaterializedGroup> {
    let scope = request.validate(policy)?;
    if !session.can(Capability::CreateSchedules, &scope) {
        return Err(ScheduleError::Unauthorized(Capability::CreateSchedules));
    }

    let plan = build_plan(request, scope, session.user_id)?;
    persist_plan(store, plan).await
}

/// Persist an already-built plan: parent first, then the child batch.
pub async fn persist_plan<S: ScheduleStore>(
    store: &S,
    plan: SchedulePlan,
) -> Result<MaterializedGroup> {
    let parent_id = store
        .insert_one(plan.parent.clone())
        .await
        .map_err(|source| PersistenceError::ParentInsert { source })?;
    debug!(%parent_id, "created parent schedule");

    let children = retry_children(store, &plan, parent_id).await?;

    Ok(MaterializedGroup {
        parent_id,
        parent: plan.parent,
        children,
    })
}

/// Insert the children of `plan` under an already-stored parent.
///
/// Used by [`persist_plan`], and by callers recovering from a partial failure.
pub async fn retry_children<S: ScheduleStore>(
    store: &S,
    plan: &SchedulePlan,
    parent_id: ScheduleId,
) -> Result<Vec<NewScheduleRecord>> {
    let children = plan.linked_children(parent_id);
    if children.is_empty() {
        return Ok(children);
    }

    let pending = children.len();
    if let Err(source) = store.insert_many(children.clone()).await {
        warn!(
            %parent_id,
            pending,
            error = %source,
            "child schedule batch failed, parent left without children"
        );
        return Err(PersistenceError::ChildInsert {
            parent_id,
            pending,
            source,
        }
        .into());
    }
    debug!(%parent_id, children = pending, "created child schedules");

    Ok(children)
}
