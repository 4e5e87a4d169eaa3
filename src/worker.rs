/// The background worker: owns the tab-context cache and everything that
/// writes to it
///
/// All state lives behind one `RefCell` that is only borrowed between
/// suspension points, never across them.
use crate::actions::{
    ActionKind, ActionOutcome, ActionRequest, ActivityScope, ClearTrigger, ObjectRef, UserCache, activity_log_url,
    clear_scope, copy_id, delete_object, outcome_value, share_with_self,
};
use crate::bridge::{fetch_bytes, is_injectable};
use crate::bus::{EventBus, Subscription};
use crate::cache::{TabContextCache, WriteOutcome};
use crate::clipboard::{candidate_id, recognize};
use crate::coalesce::{COALESCE_WINDOW_MS, Coalescer};
use crate::codec::parse_host_url;
use crate::context::{ObjectInstance, TabContext, TabId};
use crate::cookies::{ClearReport, CookieClearMode, RecentInstances, clear_cookies};
use crate::detect::{self, enrich_object, partial_context};
use crate::env::HostEnv;
use crate::error::{Result, ToolkitError};
use crate::favicon::{Decoration, FaviconEffect, FaviconEngine, RuleSet, render, to_data_url};
use crate::messages::{Reply, Request, WorkerEvent};
use crate::observer::Hint;
use crate::parent::ParentMemo;
use crate::registry::Registry;
use crate::settings::Settings;
use crate::storage::{
    SessionSnapshot, load_recent_instances, load_session, load_settings, save_recent_instances, save_session,
    save_settings,
};
use futures::FutureExt;
use futures::future::{AbortHandle, Abortable};
use log::{debug, info, warn};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

/// Page favicon used as the base for stripe decorations
const PAGE_FAVICON_PATH: &str = "/favicon.ico";

struct WorkerState {
    cache: TabContextCache,
    coalescer: Coalescer,
    last_sequence: u64,
    /// Latest detection run started per tab and not yet past its suspension points
    runs: HashMap<TabId, u64>,
    enrichments: HashMap<TabId, (u64, AbortHandle)>,
    settings: Settings,
    rules: RuleSet,
    recent: RecentInstances,
    /// Logo image URL per instance, as reported by page observers
    instance_logos: HashMap<String, String>,
    /// Data URL last installed per tab
    applied_favicons: HashMap<TabId, String>,
    clearing_cookies: bool,
}

pub struct Worker<E: HostEnv> {
    env: Rc<E>,
    state: RefCell<WorkerState>,
    bus: EventBus,
    favicons: FaviconEngine,
    memo: RefCell<ParentMemo>,
    users: RefCell<UserCache>,
}

impl<E: HostEnv> Worker<E> {
    pub fn new(env: Rc<E>, settings: Settings, session: SessionSnapshot, recent: Vec<String>) -> Rc<Self> {
        let last_sequence = session.sequences().map(|(_, sequence)| sequence).max().unwrap_or(0);
        let state = WorkerState {
            cache: TabContextCache::restore(session.contexts),
            coalescer: Coalescer::new(),
            last_sequence,
            runs: HashMap::new(),
            enrichments: HashMap::new(),
            rules: RuleSet::compile(&settings.favicon_rules),
            settings,
            recent: RecentInstances::from_list(recent),
            instance_logos: HashMap::new(),
            applied_favicons: HashMap::new(),
            clearing_cookies: false,
        };

        Rc::new(Worker {
            env,
            state: RefCell::new(state),
            bus: EventBus::new(),
            favicons: FaviconEngine::new(),
            memo: RefCell::new(ParentMemo::new()),
            users: RefCell::new(UserCache::default()),
        })
    }

    /// Rehydrate settings, the context cache and recent instances from storage
    pub async fn start(env: Rc<E>) -> Rc<Self> {
        let settings = load_settings(&*env).await;
        let session = load_session(&*env).await;
        let recent = load_recent_instances(&*env).await;
        info!(
            "worker starting with {} cached contexts and {} favicon rules",
            session.contexts.len(),
            settings.favicon_rules.len()
        );
        Worker::new(env, settings, session, recent)
    }

    pub fn subscribe(&self, listener: impl Fn(&WorkerEvent) + 'static) -> Subscription {
        self.bus.subscribe(listener)
    }

    pub fn cached(&self, tab_id: TabId) -> Option<TabContext> {
        self.state.borrow().cache.get(tab_id).cloned()
    }

    pub fn settings(&self) -> Settings {
        self.state.borrow().settings.clone()
    }

    fn spawn(&self, task: impl Future<Output = ()> + 'static) {
        self.env.spawn(task.boxed_local());
    }

    /// Schedule a detection after the coalescing window; later triggers for
    /// the same tab supersede this one
    pub fn trigger(self: &Rc<Self>, tab_id: TabId, reason: &str) {
        let generation = self.state.borrow_mut().coalescer.trigger(tab_id);
        debug!("tab {}: detection triggered ({}), generation {}", tab_id, reason, generation);

        let worker = self.clone();
        self.spawn(async move {
            worker.env.sleep(COALESCE_WINDOW_MS).await;
            {
                let mut state = worker.state.borrow_mut();
                if !state.coalescer.is_current(tab_id, generation) {
                    return;
                }
                state.coalescer.settle(tab_id, generation);
            }
            worker.detect(tab_id).await;
        });
    }

    /// Detect now, bypassing coalescing and forgetting parent lookups for the tab
    pub async fn force_redetect(self: &Rc<Self>, tab_id: TabId) -> Option<TabContext> {
        self.state.borrow_mut().coalescer.cancel(tab_id);
        self.memo.borrow_mut().forget_tab(tab_id);
        self.detect(tab_id).await
    }

    /// Cached context, or a fresh detection the first time a tab is asked for
    pub async fn get_tab_context(self: &Rc<Self>, tab_id: TabId) -> Option<TabContext> {
        let (cached, busy) = {
            let state = self.state.borrow();
            let busy = state.coalescer.is_pending(tab_id) || state.runs.contains_key(&tab_id);
            (state.cache.get(tab_id).cloned(), busy)
        };
        match cached {
            Some(context) => Some(context),
            None if busy => None,
            None => self.detect(tab_id).await,
        }
    }

    /// One detection run: commit a partial context, then enrich in the background
    pub async fn detect(self: &Rc<Self>, tab_id: TabId) -> Option<TabContext> {
        let sequence = self.begin_run(tab_id);

        let tab = match self.env.get_tab(tab_id).await {
            Ok(tab) => tab,
            Err(err) => {
                debug!("tab {}: cannot detect: {}", tab_id, err);
                self.end_run(tab_id, sequence);
                return None;
            }
        };
        let host_domains = self.state.borrow().settings.host_domains.clone();
        let host_url = if is_injectable(&tab.url) {
            detect::host_url(&tab, &host_domains)
        } else {
            debug!("tab {}: {} does not allow injection", tab_id, tab.url);
            None
        };
        let modal = match host_url {
            Some(_) => self.env.query_modal(tab_id).await,
            None => None,
        };
        if !self.end_run(tab_id, sequence) {
            debug!("tab {}: run {} superseded", tab_id, sequence);
            return None;
        }

        let (context, favicon_stale) = {
            let state = self.state.borrow();
            let previous = state.cache.get(tab_id);
            let context = partial_context(&tab, host_url.as_ref(), modal.as_ref(), previous, sequence, self.env.now());
            let applied = state.applied_favicons.get(&tab_id).map(String::as_str);
            (context, tab.fav_icon_url.as_deref() != applied)
        };
        debug!(
            "tab {}: run {} found instance {:?}, object {:?}",
            tab_id,
            sequence,
            context.instance,
            context.object.as_ref().map(|o| (o.type_id, o.id.as_str()))
        );

        if let Some(instance) = &context.instance {
            self.touch_instance(instance);
        }
        if self.commit(context.clone(), favicon_stale) {
            if let (Some(url), Some(object)) = (host_url, context.object.clone()) {
                self.spawn_enrichment(context.clone(), url.origin, object);
            }
        }
        Some(context)
    }

    fn begin_run(&self, tab_id: TabId) -> u64 {
        let mut state = self.state.borrow_mut();
        state.last_sequence += 1;
        let sequence = state.last_sequence;
        if let Some((_, handle)) = state.enrichments.remove(&tab_id) {
            handle.abort();
        }
        state.runs.insert(tab_id, sequence);
        sequence
    }

    /// Whether `sequence` is still the tab's latest run
    fn end_run(&self, tab_id: TabId, sequence: u64) -> bool {
        let mut state = self.state.borrow_mut();
        if state.runs.get(&tab_id) == Some(&sequence) {
            state.runs.remove(&tab_id);
            true
        } else {
            false
        }
    }

    fn touch_instance(&self, instance: &str) {
        let recent = {
            let mut state = self.state.borrow_mut();
            if state.recent.most_recent(1).first().map(String::as_str) == Some(instance) {
                return;
            }
            state.recent.touch(instance);
            state.recent.to_list()
        };

        let env = self.env.clone();
        self.spawn(async move {
            if let Err(err) = save_recent_instances(&*env, &recent).await {
                warn!("could not save recent instances: {}", err);
            }
        });
    }

    fn spawn_enrichment(self: &Rc<Self>, partial: TabContext, origin: String, object: ObjectInstance) {
        let tab_id = partial.tab_id;
        let sequence = partial.sequence;
        let (handle, registration) = AbortHandle::new_pair();
        self.state.borrow_mut().enrichments.insert(tab_id, (sequence, handle));

        let worker = self.clone();
        let task = Abortable::new(async move { worker.enrich(partial, origin, object).await }, registration);
        self.spawn(async move {
            if task.await.is_err() {
                debug!("tab {}: enrichment for run {} aborted", tab_id, sequence);
            }
        });
    }

    async fn enrich(self: &Rc<Self>, partial: TabContext, origin: String, object: ObjectInstance) {
        let tab_id = partial.tab_id;
        let result = enrich_object(&*self.env, tab_id, &origin, object.clone(), &self.memo).await;
        {
            let mut state = self.state.borrow_mut();
            if state.enrichments.get(&tab_id).is_some_and(|(sequence, _)| *sequence == partial.sequence) {
                state.enrichments.remove(&tab_id);
            }
        }

        let mut context = partial;
        match result {
            Ok(enriched) if same_object(&object, &enriched) => {
                debug!("tab {}: enrichment changed nothing", tab_id);
                return;
            }
            Ok(enriched) => context.object = Some(enriched),
            Err(err) if err.is_not_found() => {
                info!("tab {}: {} {} no longer exists", tab_id, object.type_id, object.id);
                context.object = None;
            }
            Err(err) if err.is_header_overflow() => {
                self.clear_after_overflow(&context.url).await;
                return;
            }
            Err(ToolkitError::InjectionForbidden) => {
                info!("tab {}: injection forbidden, treating as a non-host page", tab_id);
                context.instance = None;
                context.object = None;
            }
            Err(ToolkitError::MissingParent) => return,
            Err(err) => {
                warn!("tab {}: enrichment of {} {} failed: {}", tab_id, object.type_id, object.id, err);
                return;
            }
        }
        context.last_updated_at = self.env.now();
        self.commit(context, false);
    }

    /// Write a context, broadcast it and refresh the tab's title and favicon.
    /// Returns false when a newer run already wrote the tab.
    fn commit(self: &Rc<Self>, context: TabContext, favicon_stale: bool) -> bool {
        let tab_id = context.tab_id;
        let (outcome, previous) = {
            let mut state = self.state.borrow_mut();
            let previous = state.cache.get(tab_id).cloned();
            (state.cache.write(context.clone()), previous)
        };
        if matches!(outcome, WriteOutcome::Stale { .. }) {
            return false;
        }

        self.bus.publish(WorkerEvent::TabContextUpdated {
            tab_id,
            context: Some(context.clone()),
        });
        self.persist_session();
        self.refresh_decoration(previous.as_ref(), &context, favicon_stale);
        true
    }

    fn persist_session(&self) {
        let snapshot = SessionSnapshot::new(self.state.borrow().cache.snapshot());
        let env = self.env.clone();
        self.spawn(async move {
            if let Err(err) = save_session(&*env, &snapshot).await {
                warn!("could not save tab contexts: {}", err);
            }
        });
    }

    fn refresh_decoration(self: &Rc<Self>, previous: Option<&TabContext>, context: &TabContext, favicon_stale: bool) {
        let Some(instance) = context.instance.clone() else {
            return;
        };
        let identity = context.identity();
        let identity_changed = previous.is_none_or(|p| p.identity() != identity);
        let instance_changed = previous.is_none_or(|p| p.instance.as_deref() != Some(instance.as_str()));

        let title = identity.filter(|_| identity_changed).and_then(|identity| identity.name);
        let refavicon = identity_changed || instance_changed || favicon_stale;
        if title.is_none() && !refavicon {
            return;
        }

        let tab_id = context.tab_id;
        let worker = self.clone();
        self.spawn(async move {
            if let Some(title) = title {
                if let Err(err) = worker.env.set_title(tab_id, &title).await {
                    debug!("tab {}: title not set: {}", tab_id, err);
                }
            }
            if refavicon {
                worker.apply_favicon(tab_id, instance).await;
            }
        });
    }

    async fn apply_favicon(self: Rc<Self>, tab_id: TabId, instance: String) {
        let (decoration, logo) = {
            let state = self.state.borrow();
            (state.rules.select(&instance), state.instance_logos.get(&instance).cloned())
        };
        let key = decoration.cache_key(&instance);
        let env = self.env.clone();
        let composed = self
            .favicons
            .decorate(key, move || compose_favicon(env, tab_id, decoration, logo).boxed_local())
            .await;

        let data_url = match composed {
            Ok(data_url) => data_url,
            Err(err) => {
                warn!("tab {}: favicon for {} not composed: {}", tab_id, instance, err);
                return;
            }
        };
        match self.env.set_favicon(tab_id, &data_url).await {
            Ok(()) => {
                self.state.borrow_mut().applied_favicons.insert(tab_id, data_url);
            }
            Err(err) => debug!("tab {}: favicon not installed: {}", tab_id, err),
        }
    }

    fn redecorate(self: &Rc<Self>, only_instance: Option<&str>) {
        let targets: Vec<(TabId, String)> = self
            .state
            .borrow()
            .cache
            .snapshot()
            .into_iter()
            .filter_map(|context| Some((context.tab_id, context.instance?)))
            .filter(|(_, instance)| only_instance.is_none_or(|only| only == instance.as_str()))
            .collect();

        for (tab_id, instance) in targets {
            let worker = self.clone();
            self.spawn(async move { worker.apply_favicon(tab_id, instance).await });
        }
    }

    /// Drop everything held for a closed tab
    pub fn on_tab_removed(&self, tab_id: TabId) {
        let removed = {
            let mut state = self.state.borrow_mut();
            state.coalescer.cancel(tab_id);
            state.runs.remove(&tab_id);
            if let Some((_, handle)) = state.enrichments.remove(&tab_id) {
                handle.abort();
            }
            state.applied_favicons.remove(&tab_id);
            state.cache.remove(tab_id).is_some()
        };
        self.memo.borrow_mut().forget_tab(tab_id);
        self.users.borrow_mut().forget_tab(tab_id);

        info!("tab {}: removed", tab_id);
        self.bus.publish(WorkerEvent::TabContextUpdated { tab_id, context: None });
        if removed {
            self.persist_session();
        }
    }

    pub fn on_hint(self: &Rc<Self>, tab_id: TabId, hint: Hint) {
        match hint {
            Hint::InstanceLogo { src } => self.record_instance_logo(tab_id, src),
            Hint::UrlChanged { .. } => self.trigger(tab_id, "url changed"),
            Hint::ModalOpened { .. } => self.trigger(tab_id, "modal opened"),
            Hint::ModalClosed => self.trigger(tab_id, "modal closed"),
        }
    }

    fn record_instance_logo(self: &Rc<Self>, tab_id: TabId, src: String) {
        let instance = {
            let mut state = self.state.borrow_mut();
            let Some(instance) = state.cache.get(tab_id).and_then(|c| c.instance.clone()) else {
                return;
            };
            if state.instance_logos.get(&instance) == Some(&src) {
                return;
            }
            state.instance_logos.insert(instance.clone(), src);
            instance
        };
        debug!("instance {}: logo changed", instance);

        self.favicons.forget_instance(&instance);
        if self.state.borrow().rules.select(&instance).effect == FaviconEffect::InstanceLogo {
            self.redecorate(Some(&instance));
        }
    }

    pub fn purge_favicons(self: &Rc<Self>) {
        self.favicons.purge();
        self.state.borrow_mut().applied_favicons.clear();
        self.redecorate(None);
    }

    /// Adopt new settings: recompile rules, redraw favicons, persist
    pub fn apply_settings(self: &Rc<Self>, settings: Settings) {
        {
            let mut state = self.state.borrow_mut();
            state.rules = RuleSet::compile(&settings.favicon_rules);
            state.settings = settings.clone();
        }
        info!("settings updated");
        self.purge_favicons();

        let env = self.env.clone();
        self.spawn(async move {
            if let Err(err) = save_settings(&*env, &settings).await {
                warn!("could not save settings: {}", err);
            }
        });
    }

    /// Clear cookies after the host answered 431 on `url`, as the clear mode allows
    pub async fn clear_after_overflow(&self, url: &str) -> Option<ClearReport> {
        let (host_domain, scope) = {
            let state = self.state.borrow();
            if state.clearing_cookies {
                debug!("cookie clear already running");
                return None;
            }
            let (instance, host_domain) = cookie_target(&state.settings, url)?;
            let mode = state.settings.cookie_clear_mode;
            let Some(scope) = clear_scope(mode, ClearTrigger::HeaderOverflow, &instance, &state.recent) else {
                debug!("431 on {} left alone in {:?} mode", instance, mode);
                return None;
            };
            (host_domain, scope)
        };

        info!("431 from {}: clearing cookies {:?}", url, scope);
        self.state.borrow_mut().clearing_cookies = true;
        let result = clear_cookies(&*self.env, &host_domain, &scope).await;
        self.state.borrow_mut().clearing_cookies = false;

        match result {
            Ok(report) => Some(report),
            Err(err) => {
                warn!("cookie clear after 431 failed: {}", err);
                None
            }
        }
    }

    async fn context_for(self: &Rc<Self>, tab_id: TabId) -> Result<TabContext> {
        self.get_tab_context(tab_id).await.ok_or(ToolkitError::NoTabContext)
    }

    fn origin_of(&self, context: &TabContext) -> Result<String> {
        parse_host_url(&context.url, &self.state.borrow().settings.host_domains)
            .map(|url| url.origin)
            .ok_or_else(|| ToolkitError::Unsupported("this tab is not on an instance".to_string()))
    }

    pub async fn dispatch(self: &Rc<Self>, request: ActionRequest) -> Result<ActionOutcome> {
        let tab_id = request.tab_id;
        let context = self.context_for(tab_id).await?;
        debug!("tab {}: action {:?}", tab_id, request.kind);

        if request.kind == ActionKind::ClearInstanceCookies {
            return self.clear_instance_cookies(&context, request.params.mode).await;
        }

        let detected = context.object.as_ref();
        let object = request
            .object_ref
            .or_else(|| detected.map(ObjectRef::from))
            .ok_or_else(|| ToolkitError::Unsupported("no object on this page".to_string()))?;
        let object_type = Registry::global()
            .get(object.type_id)
            .ok_or_else(|| ToolkitError::Unsupported(format!("unknown type {}", object.type_id)))?;

        match request.kind {
            ActionKind::CopyId => {
                let details = detected.filter(|d| d.type_id == object.type_id && d.id == object.id).and_then(|d| d.details());
                copy_id(&*self.env, object_type, &object, details, request.params.include_secondary).await
            }
            _ if object_type.requires_parent_for_api() && object.parent_id.is_none() => Err(ToolkitError::MissingParent),
            ActionKind::ShareWithSelf => share_with_self(&*self.env, tab_id, object_type, &object, &self.users).await,
            ActionKind::Delete => {
                let outcome = delete_object(&*self.env, tab_id, object_type, &object).await?;
                self.force_redetect(tab_id).await;
                Ok(outcome)
            }
            ActionKind::ClearInstanceCookies => self.clear_instance_cookies(&context, request.params.mode).await,
        }
    }

    async fn clear_instance_cookies(&self, context: &TabContext, mode: Option<CookieClearMode>) -> Result<ActionOutcome> {
        let (host_domain, scope) = {
            let state = self.state.borrow();
            let (instance, host_domain) = cookie_target(&state.settings, &context.url)
                .ok_or_else(|| ToolkitError::Unsupported("this tab is not on an instance".to_string()))?;
            let mode = mode.unwrap_or(state.settings.cookie_clear_mode);
            let scope = clear_scope(mode, ClearTrigger::Manual, &instance, &state.recent)
                .ok_or_else(|| ToolkitError::Unsupported(format!("{:?} mode has no manual clear", mode)))?;
            (host_domain, scope)
        };
        let report = clear_cookies(&*self.env, &host_domain, &scope).await?;
        Ok(ActionOutcome::CookiesCleared { report })
    }

    pub async fn open_activity_log(self: &Rc<Self>, tab_id: TabId, scope: ActivityScope) -> Result<String> {
        let context = self.context_for(tab_id).await?;
        let origin = self.origin_of(&context)?;
        let url = activity_log_url(&origin, scope, context.object.as_ref())?;
        self.env.open_tab(&url).await?;
        info!("tab {}: opened activity log {}", tab_id, url);
        Ok(url)
    }

    /// Recognize a copied identifier and tell every surface about it
    pub async fn on_clipboard(&self, value: String, sender_tab: Option<TabId>) -> Result<Option<ObjectInstance>> {
        let recognized = match (candidate_id(&value), self.clipboard_target(sender_tab)) {
            (Some(id), Some((tab_id, origin))) => recognize(&*self.env, tab_id, &origin, id).await,
            _ => None,
        };
        self.bus.publish(WorkerEvent::ClipboardUpdated {
            value,
            recognized: recognized.clone(),
        });
        Ok(recognized)
    }

    /// Tab to resolve clipboard ids through: the sender if it is on an instance,
    /// else the newest tab on the default instance, else the newest instance tab
    fn clipboard_target(&self, sender_tab: Option<TabId>) -> Option<(TabId, String)> {
        let state = self.state.borrow();
        let domains = &state.settings.host_domains;
        let origin_of = |context: &TabContext| parse_host_url(&context.url, domains).map(|url| (context.tab_id, url.origin));

        if let Some(found) = sender_tab.and_then(|tab_id| state.cache.get(tab_id)).and_then(origin_of) {
            return Some(found);
        }

        let contexts = state.cache.snapshot();
        let preferred = state.settings.default_instance.as_deref();
        contexts
            .iter()
            .rev()
            .filter(|context| context.is_host_page())
            .find(|context| preferred.is_some() && context.instance.as_deref() == preferred)
            .or_else(|| contexts.iter().rev().find(|context| context.is_host_page()))
            .and_then(origin_of)
    }

    /// Entry point for every message; errors become failure replies
    pub async fn handle_message(self: &Rc<Self>, request: Request, sender_tab: Option<TabId>) -> Reply {
        let kind = request.kind();
        debug!("handling {}", kind);
        let result = self.route(request, sender_tab).await;
        if let Err(err) = &result {
            warn!("{} failed: {}", kind, err);
        }
        Reply::from_result(result)
    }

    async fn route(self: &Rc<Self>, request: Request, sender_tab: Option<TabId>) -> Result<Value> {
        match request {
            Request::GetTabContext { tab_id } => Ok(serde_json::to_value(self.get_tab_context(tab_id).await)?),
            Request::DetectContext { tab_id, reason, force } => {
                let tab_id = tab_id.or(sender_tab).ok_or(ToolkitError::NoTabContext)?;
                if force {
                    Ok(serde_json::to_value(self.force_redetect(tab_id).await)?)
                } else {
                    self.trigger(tab_id, reason.as_deref().unwrap_or("requested"));
                    Ok(Value::Null)
                }
            }
            Request::ClipboardCopied { value } => Ok(serde_json::to_value(self.on_clipboard(value, sender_tab).await?)?),
            Request::OpenActivityLog { tab_id, scope } => {
                let url = self.open_activity_log(tab_id, scope).await?;
                Ok(json!({ "url": url }))
            }
            Request::Action(action) => {
                let tab_id = action.tab_id;
                match self.dispatch(action).await {
                    Ok(outcome) => Ok(outcome_value(&outcome)),
                    Err(err) => {
                        if err.is_header_overflow() {
                            if let Some(context) = self.cached(tab_id) {
                                self.clear_after_overflow(&context.url).await;
                            }
                        }
                        Err(err)
                    }
                }
            }
            Request::ObserverHint { tab_id, hint } => {
                let tab_id = tab_id.or(sender_tab).ok_or(ToolkitError::NoTabContext)?;
                self.on_hint(tab_id, hint);
                Ok(Value::Null)
            }
            Request::HostResponseObserved { tab_id, url, status } => {
                if status == 431 {
                    debug!("tab {}: host answered 431", tab_id);
                    self.clear_after_overflow(&url).await;
                }
                Ok(Value::Null)
            }
            Request::PurgeFaviconCache => {
                self.purge_favicons();
                Ok(Value::Null)
            }
            Request::SettingsChanged { settings } => {
                self.apply_settings(settings);
                Ok(Value::Null)
            }
        }
    }
}

/// Same object with the same parent, link and metadata
fn same_object(a: &ObjectInstance, b: &ObjectInstance) -> bool {
    a.identity() == b.identity() && a.parent_pending == b.parent_pending && a.url == b.url && a.metadata == b.metadata
}

/// `(instance, host domain)` of a host URL
fn cookie_target(settings: &Settings, url: &str) -> Option<(String, String)> {
    let instance = parse_host_url(url, &settings.host_domains)?.instance;
    let parsed = url::Url::parse(url).ok()?;
    let host_domain = settings.host_domain_for(parsed.host_str()?)?.to_string();
    Some((instance, host_domain))
}

async fn compose_favicon<E: HostEnv>(env: Rc<E>, tab_id: TabId, decoration: Decoration, logo: Option<String>) -> Result<String> {
    let source_path = match decoration.effect {
        FaviconEffect::InstanceLogo => logo,
        effect if effect.is_stripe() => Some(PAGE_FAVICON_PATH.to_string()),
        _ => None,
    };
    let source = match source_path {
        Some(path) => fetch_bytes(&*env, tab_id, &path)
            .await
            .inspect_err(|err| debug!("tab {}: favicon source {} unavailable: {}", tab_id, path, err))
            .ok(),
        None => None,
    };
    to_data_url(&render(&decoration, source.as_deref())?)
}
