//! In-memory GitLab used by the engine tests.

use async_trait::async_trait;
use gitlab_client::{Error, Label, Project, ProjectClient, ProjectCreatePayload, ProjectId};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

/// First id handed out to a project created through the fake.
pub(crate) const FIRST_CREATED_ID: u64 = 1000;

/// One call received by the fake, in the order it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    CreateProject(String),
    DeleteProject(u64),
    ListProjects(u32),
    ListLabels(u64),
    CreateLabel(u64, String),
    DeleteLabel(u64, String),
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    projects: BTreeMap<u64, Vec<Label>>,
    default_labels: Vec<Label>,
    pages: Option<Vec<Vec<u64>>>,
    page_size: usize,
    failing_projects: HashSet<u64>,
    fail_create_project: bool,
    fail_delete_project: bool,
    calls: Vec<Call>,
}

/// A fake GitLab instance. Projects created through it start with the
/// configured instance default labels. Creating a label whose name already
/// exists adds a second copy, so duplicate creation is observable.
#[derive(Debug)]
pub(crate) struct FakeGitLab {
    state: Mutex<State>,
}

fn failure() -> Error {
    Error::Api {
        status: 500,
        message: "500 Internal Server Error".to_string(),
    }
}

impl FakeGitLab {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: FIRST_CREATED_ID,
                page_size: 100,
                ..State::default()
            }),
        }
    }

    /// Labels every newly created project starts with.
    pub(crate) fn with_default_labels(self, labels: Vec<Label>) -> Self {
        self.state.lock().unwrap().default_labels = labels;
        self
    }

    pub(crate) fn with_project(self, id: u64, labels: Vec<Label>) -> Self {
        self.state.lock().unwrap().projects.insert(id, labels);
        self
    }

    /// Serves exactly these pages from `list_projects`, regardless of which
    /// projects exist. Pages past the end are empty.
    pub(crate) fn with_pages(self, pages: Vec<Vec<u64>>) -> Self {
        self.state.lock().unwrap().pages = Some(pages);
        self
    }

    pub(crate) fn with_page_size(self, page_size: usize) -> Self {
        self.state.lock().unwrap().page_size = page_size;
        self
    }

    /// Every label operation on this project fails.
    pub(crate) fn with_failing_project(self, id: u64) -> Self {
        self.state.lock().unwrap().failing_projects.insert(id);
        self
    }

    pub(crate) fn failing_create_project(self) -> Self {
        self.state.lock().unwrap().fail_create_project = true;
        self
    }

    pub(crate) fn failing_delete_project(self) -> Self {
        self.state.lock().unwrap().fail_delete_project = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn labels_of(&self, id: u64) -> Vec<Label> {
        self.state
            .lock()
            .unwrap()
            .projects
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn project_exists(&self, id: u64) -> bool {
        self.state.lock().unwrap().projects.contains_key(&id)
    }

    fn label_call(&self, id: ProjectId, call: Call) -> Result<std::sync::MutexGuard<'_, State>, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing_projects.contains(&id.get()) {
            return Err(failure());
        }
        if !state.projects.contains_key(&id.get()) {
            return Err(Error::Api {
                status: 404,
                message: "404 Project Not Found".to_string(),
            });
        }
        Ok(state)
    }
}

fn project(id: u64) -> Project {
    Project {
        id: ProjectId::new(id).unwrap(),
        name: format!("project-{id}"),
        path_with_namespace: None,
    }
}

#[async_trait]
impl ProjectClient for FakeGitLab {
    async fn create_project(&self, payload: &ProjectCreatePayload) -> Result<Project, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateProject(payload.name.clone()));
        if state.fail_create_project {
            return Err(failure());
        }

        let id = state.next_id;
        state.next_id += 1;
        let labels = state.default_labels.clone();
        state.projects.insert(id, labels);

        Ok(project(id))
    }

    async fn delete_project(&self, project_id: ProjectId) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::DeleteProject(project_id.get()));
        if state.fail_delete_project {
            return Err(failure());
        }

        state.projects.remove(&project_id.get());
        Ok(())
    }

    async fn list_projects(&self, page: u32) -> Result<Vec<Project>, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListProjects(page));

        let index = page.saturating_sub(1) as usize;
        let ids: Vec<u64> = match &state.pages {
            Some(pages) => pages.get(index).cloned().unwrap_or_default(),
            None => state
                .projects
                .keys()
                .skip(index * state.page_size)
                .take(state.page_size)
                .copied()
                .collect(),
        };

        Ok(ids.into_iter().map(project).collect())
    }

    async fn list_labels(&self, project_id: ProjectId) -> Result<Vec<Label>, Error> {
        let state = self.label_call(project_id, Call::ListLabels(project_id.get()))?;
        let mut labels = state.projects[&project_id.get()].clone();
        labels.truncate(100);
        Ok(labels)
    }

    async fn create_label(&self, project_id: ProjectId, label: &Label) -> Result<(), Error> {
        let mut state =
            self.label_call(project_id, Call::CreateLabel(project_id.get(), label.name.clone()))?;
        if let Some(labels) = state.projects.get_mut(&project_id.get()) {
            labels.push(label.clone());
        }
        Ok(())
    }

    async fn delete_label(&self, project_id: ProjectId, name: &str) -> Result<(), Error> {
        let mut state =
            self.label_call(project_id, Call::DeleteLabel(project_id.get(), name.to_string()))?;
        if let Some(labels) = state.projects.get_mut(&project_id.get()) {
            labels.retain(|l| l.name != name);
        }
        Ok(())
    }
}

pub(crate) fn label(name: &str, color: &str) -> Label {
    Label::new(name, color, None)
}

pub(crate) fn id(value: u64) -> ProjectId {
    ProjectId::new(value).unwrap()
}
