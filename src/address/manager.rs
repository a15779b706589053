//! Scope stacks, one per logical rendering flow.
//!
//! Each manager keeps a stack of [`DocumentUrlContext`]s per flow. A flow is
//! a tokio task entered through [`DocumentUrlContextManager::scope_flow`]
//! (survives `.await` and worker hops), or the current thread otherwise.
//!
//! Tasks on a tokio runtime share their worker's thread, so scopes opened
//! there outside a flow are rejected with [`AddressError::FlowRequired`].
//!
//! ```text
//! flow A:  root -> Foo.Bar/ -> Foo.Bar/Baz/     (active = Foo.Bar/Baz/)
//! flow B:  root -> Other/                       (active = Other/)
//! ```
//!
//! Scopes are released by dropping their [`ScopeHandle`], in reverse order
//! of acquisition. Releasing anything but the top of the stack fails.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use rustc_hash::FxHashMap;

use super::AddressError;
use super::context::{DirectoryMetadata, DocumentUrlContext, LinkMode, parse_base_url};
use crate::model::ScopeModel;

// ============================================================================
// Flow-local storage
// ============================================================================

/// Scope stacks of one flow, keyed by manager id.
#[derive(Default)]
struct FlowStacks {
    stacks: FxHashMap<u64, Vec<(u64, Arc<DocumentUrlContext>)>>,
}

tokio::task_local! {
    static FLOW: RefCell<FlowStacks>;
}

thread_local! {
    static THREAD_FLOW: RefCell<FlowStacks> = RefCell::new(FlowStacks::default());
}

#[inline]
fn in_task_flow() -> bool {
    FLOW.try_with(|_| ()).is_ok()
}

/// Run `f` on the current flow's stacks.
fn with_flow<R>(f: impl FnOnce(&mut FlowStacks) -> R) -> R {
    if in_task_flow() {
        FLOW.with(|flow| f(&mut flow.borrow_mut()))
    } else {
        THREAD_FLOW.with(|flow| f(&mut flow.borrow_mut()))
    }
}

static NEXT_MANAGER_ID: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// Manager
// ============================================================================

/// Creates scopes and tracks the active one per flow.
pub struct DocumentUrlContextManager {
    id: u64,
    mode: Arc<LinkMode>,
    /// Parsed directories, keyed by the directory string as given.
    directories: DashMap<Box<str>, Arc<DirectoryMetadata>>,
    /// Shared scope for the site root without a model.
    root: Arc<DocumentUrlContext>,
    next_token: AtomicU64,
}

impl DocumentUrlContextManager {
    fn with_mode(mode: LinkMode) -> Self {
        let mode = Arc::new(mode);
        let root = DocumentUrlContext::new(
            Arc::new(DirectoryMetadata::root()),
            None,
            Arc::clone(&mode),
        );
        Self {
            id: NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed),
            mode,
            directories: DashMap::new(),
            root: Arc::new(root),
            next_token: AtomicU64::new(1),
        }
    }

    /// Document-relative links (`../Foo.Bar/Baz.html`).
    pub fn relative() -> Self {
        Self::with_mode(LinkMode::Relative)
    }

    /// Absolute links under `base_url` (`https://docs.example.com/api/`).
    ///
    /// The base must be an absolute http(s) URL. A missing trailing `/` is
    /// added; query and fragment are dropped.
    pub fn absolute(base_url: &str) -> Result<Self, AddressError> {
        parse_base_url(base_url).map(|url| Self::with_mode(LinkMode::Absolute(url)))
    }

    #[inline]
    pub fn mode(&self) -> &LinkMode {
        &self.mode
    }

    /// The active scope of the current flow, or the shared root scope.
    pub fn active_scope(&self) -> Arc<DocumentUrlContext> {
        with_flow(|flow| {
            flow.stacks
                .get(&self.id)
                .and_then(|stack| stack.last())
                .map(|(_, context)| Arc::clone(context))
        })
        .unwrap_or_else(|| Arc::clone(&self.root))
    }

    /// Number of open scopes in the current flow.
    pub fn depth(&self) -> usize {
        with_flow(|flow| flow.stacks.get(&self.id).map_or(0, Vec::len))
    }

    /// Parsed directory, memoized per directory string.
    pub fn directory_metadata(&self, directory: &str) -> Result<Arc<DirectoryMetadata>, AddressError> {
        if let Some(metadata) = self.directories.get(directory) {
            return Ok(Arc::clone(metadata.value()));
        }
        let metadata = Arc::new(DirectoryMetadata::parse(directory)?);
        self.directories
            .insert(Box::from(directory), Arc::clone(&metadata));
        Ok(metadata)
    }

    /// Enter the document in `directory` (site-relative).
    ///
    /// The returned handle must be kept alive while the document renders;
    /// dropping it restores the previous scope.
    ///
    /// On a tokio runtime this must run inside [`scope_flow`](Self::scope_flow)
    /// or [`sync_flow`](Self::sync_flow).
    pub fn begin_scope(
        &self,
        directory: &str,
        model: Option<ScopeModel>,
    ) -> Result<ScopeHandle<'_>, AddressError> {
        let directory = directory.trim();
        if !in_task_flow() && tokio::runtime::Handle::try_current().is_ok() {
            return Err(AddressError::FlowRequired(directory.to_string()));
        }
        let context = if directory.is_empty() && model.is_none() {
            Arc::clone(&self.root)
        } else {
            let metadata = self.directory_metadata(directory)?;
            Arc::new(DocumentUrlContext::new(metadata, model, Arc::clone(&self.mode)))
        };

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let depth = with_flow(|flow| {
            let stack = flow.stacks.entry(self.id).or_default();
            stack.push((token, Arc::clone(&context)));
            stack.len()
        });
        debug!("scope"; "begin {} (depth {})", context, depth);

        Ok(ScopeHandle {
            manager: self,
            token,
            context,
            released: false,
        })
    }

    /// Release `scope`. Same as [`ScopeHandle::end`].
    pub fn end_scope(&self, scope: &mut ScopeHandle<'_>) -> Result<(), AddressError> {
        if scope.manager.id != self.id {
            return Err(AddressError::ScopeOrder {
                expected: self.active_scope().to_string(),
                found: scope.context.to_string(),
            });
        }
        scope.end()
    }

    fn release(&self, token: u64, context: &DocumentUrlContext) -> Result<(), AddressError> {
        with_flow(|flow| {
            let stack = flow.stacks.get_mut(&self.id);
            let on_top = stack
                .as_ref()
                .and_then(|stack| stack.last())
                .is_some_and(|(top, _)| *top == token);
            match stack {
                Some(stack) if on_top => {
                    stack.pop();
                    if stack.is_empty() {
                        flow.stacks.remove(&self.id);
                    }
                    Ok(())
                }
                stack => Err(AddressError::ScopeOrder {
                    expected: stack
                        .and_then(|stack| stack.last())
                        .map_or_else(|| "(none)".to_string(), |(_, top)| top.to_string()),
                    found: context.to_string(),
                }),
            }
        })?;
        debug!("scope"; "end {}", context);
        Ok(())
    }

    /// Run `future` in a fresh flow with its own scope stacks.
    ///
    /// Scopes opened inside stay invisible to other tasks, even when the
    /// future moves between worker threads.
    pub async fn scope_flow<F: Future>(future: F) -> F::Output {
        FLOW.scope(RefCell::default(), future).await
    }

    /// Synchronous counterpart of [`scope_flow`](Self::scope_flow).
    pub fn sync_flow<R>(f: impl FnOnce() -> R) -> R {
        FLOW.sync_scope(RefCell::default(), f)
    }
}

impl Default for DocumentUrlContextManager {
    fn default() -> Self {
        Self::relative()
    }
}

impl fmt::Debug for DocumentUrlContextManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentUrlContextManager")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("directories", &self.directories.len())
            .finish()
    }
}

// ============================================================================
// Scope handle
// ============================================================================

/// An open scope. Dropping it releases the scope.
///
/// Dropping out of order panics (unless the thread is already unwinding);
/// call [`end`](Self::end) to get the error instead.
#[must_use = "the scope is released as soon as the handle is dropped"]
pub struct ScopeHandle<'m> {
    manager: &'m DocumentUrlContextManager,
    token: u64,
    context: Arc<DocumentUrlContext>,
    released: bool,
}

impl ScopeHandle<'_> {
    #[inline]
    pub fn context(&self) -> &Arc<DocumentUrlContext> {
        &self.context
    }

    /// Release the scope. Fails unless it is the active scope of this flow.
    ///
    /// Releasing twice is a no-op.
    pub fn end(&mut self) -> Result<(), AddressError> {
        if self.released {
            return Ok(());
        }
        self.manager.release(self.token, &self.context)?;
        self.released = true;
        Ok(())
    }
}

impl Drop for ScopeHandle<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.end()
            && !std::thread::panicking()
        {
            panic!("{err}");
        }
    }
}

impl fmt::Debug for ScopeHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeHandle")
            .field("context", &self.context.to_string())
            .field("released", &self.released)
            .finish()
    }
}
