//! Event ingestion and per-event dispatch.
//!
//! [`Router::start`] pulls events from the transport one at a time and hands
//! each to its own task, so a slow command never blocks ingestion. Within a
//! task, [`Router::dispatch`] resolves the caller, picks the candidate
//! partitions and runs the first gate-passing command that matches.

use std::sync::Arc;

use {
    graceless_channels::{ChatEvent, Transport, gating},
    graceless_common::ErrorSender,
    graceless_config::{EnginesConfig, GracelessConfig},
    graceless_users::{User, UserStore, get_or_create},
    tokio::sync::mpsc,
    tokio_util::{sync::CancellationToken, task::TaskTracker},
    tracing::{debug, info, warn},
};

use crate::{
    Error, Result,
    commands::{
        AddPermission, DelPermission, GetPermissions, GoEngine, JsEngine, Safemode, Sed, Shutdown,
        Source, Whois,
    },
    descriptor::{Category, CommandDescriptor},
    gate::pre_check,
    handler::{CommandContext, CommandHandler},
    help::{self, HelpRequest},
    intro::Intro,
    registry::{CommandId, CommandRegistry, RegisteredCommand},
    settings::Settings,
};

/// Inbound events buffered between the transport and the dispatch loop.
const EVENT_BUFFER: usize = 64;

/// What happened to a single inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not addressed to the bot.
    Ignored,
    /// A help request was answered (or had nothing to show).
    Help,
    Executed { command: CommandId },
    /// The handler ran and returned an error, which was reported.
    CommandFailed { command: CommandId },
    /// No gate-passing command matched. Nothing was sent.
    NoMatch,
    /// The user store failed; the error was reported.
    UserLookupFailed,
}

/// Collects the collaborators a [`Router`] needs.
pub struct RouterBuilder {
    config: GracelessConfig,
    transport: Option<Arc<dyn Transport>>,
    store: Option<Arc<dyn UserStore>>,
    cancel: Option<CancellationToken>,
    extra: Vec<(CommandDescriptor, Arc<dyn CommandHandler>)>,
}

impl RouterBuilder {
    pub fn new(config: GracelessConfig) -> Self {
        Self {
            config,
            transport: None,
            store: None,
            cancel: None,
            extra: Vec::new(),
        }
    }

    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Without a store the router runs in safemode and database commands are
    /// never registered.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn UserStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Token the router stops on. A fresh one is created when not given.
    #[must_use]
    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Register an extra command after the built-ins.
    #[must_use]
    pub fn command(
        mut self,
        descriptor: CommandDescriptor,
        handler: impl CommandHandler + 'static,
    ) -> Self {
        self.extra.push((descriptor, Arc::new(handler)));
        self
    }

    pub fn build(self) -> Result<Router> {
        let transport = self.transport.ok_or(Error::MissingTransport)?;
        let cancel = self.cancel.unwrap_or_default();
        let settings = Arc::new(Settings::from_config(&self.config.bot, self.store.is_some()));
        let registry = Arc::new(CommandRegistry::new());

        if settings.is_safemode() {
            info!("starting in safemode");
        }

        registry.register(Shutdown::descriptor(), Shutdown::new(cancel.clone()));
        registry.register(Safemode::descriptor(), Safemode::new(Arc::clone(&settings)));
        registry.register(Whois::descriptor(), Whois);
        registry.register(Source::descriptor(), Source::new(&self.config.bot.source_url));

        if let Some(store) = &self.store {
            registry.register(AddPermission::descriptor(), AddPermission::new(Arc::clone(store)));
            registry.register(GetPermissions::descriptor(), GetPermissions::new(Arc::clone(store)));
            registry.register(DelPermission::descriptor(), DelPermission::new(Arc::clone(store)));
        }

        register_engines(&registry, &self.config.engines);

        for (descriptor, handler) in self.extra {
            registry.register_shared(descriptor, handler);
        }

        let intro = self
            .store
            .as_ref()
            .and_then(|_| Intro::from_config(&self.config.intro, settings.prefix()));

        Ok(Router {
            transport,
            store: self.store,
            registry,
            settings,
            intro,
            cancel,
        })
    }
}

fn register_engines(registry: &CommandRegistry, engines: &EnginesConfig) {
    if engines.sed {
        match Sed::discover() {
            Some(sed) => {
                registry.register(Sed::descriptor(), sed);
            },
            None => debug!("sed not found on PATH, skipping"),
        }
    }

    if engines.go {
        match GoEngine::discover(engines.go_binary.clone(), engines.go_imports.clone()) {
            Some(go) => {
                warn!("go engine enabled: snippets run unsandboxed");
                registry.register(GoEngine::descriptor(), go);
            },
            None => warn!("go engine enabled but no go binary was found"),
        }
    }

    if engines.js {
        registry.register(JsEngine::descriptor(), JsEngine::default());
    }
}

pub struct Router {
    transport: Arc<dyn Transport>,
    store: Option<Arc<dyn UserStore>>,
    registry: Arc<CommandRegistry>,
    settings: Arc<Settings>,
    intro: Option<Intro>,
    cancel: CancellationToken,
}

impl Router {
    /// Register a command on a running or not-yet-started router.
    pub fn register_command(
        &self,
        descriptor: CommandDescriptor,
        handler: impl CommandHandler + 'static,
    ) -> CommandId {
        self.registry.register(descriptor, handler)
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run until the cancellation token fires or the transport stream ends.
    ///
    /// No new events are admitted once cancelled; handlers already running
    /// are allowed to finish before this returns.
    pub async fn start(self: Arc<Self>, errors: ErrorSender) {
        let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
        let tunnel_cancel = self.cancel.child_token();
        let tunnel = {
            let transport = Arc::clone(&self.transport);
            let cancel = tunnel_cancel.clone();
            let errors = errors.clone();
            tokio::spawn(async move { transport.tunnel_events(cancel, tx, errors).await })
        };

        let tracker = TaskTracker::new();
        info!(transport = self.transport.id(), prefix = self.settings.prefix(), "router started");

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                event = rx.recv() => {
                    let Some(event) = event else {
                        info!("transport stream ended");
                        break;
                    };
                    let router = Arc::clone(&self);
                    let errors = errors.clone();
                    tracker.spawn(async move {
                        router.dispatch(event, &errors).await;
                    });
                },
            }
        }

        info!("Shutting down...");
        tunnel_cancel.cancel();
        tracker.close();
        tracker.wait().await;
        if let Err(e) = tunnel.await {
            errors.report(graceless_common::Error::context("transport tunnel", e));
        }
        info!("Goodbye");
    }

    /// Route a single event. Never fails: errors go to `errors`.
    pub async fn dispatch(&self, event: ChatEvent, errors: &ErrorSender) -> DispatchOutcome {
        let command_text = event
            .body
            .strip_prefix(self.settings.prefix())
            .map(|rest| rest.trim().to_string());

        if command_text.is_none()
            && self.intro.is_none()
            && self.registry.len_of(Category::Engine) == 0
        {
            return DispatchOutcome::Ignored;
        }

        debug!(
            sender = %event.sender.id,
            name = event.sender.label(),
            body = %event.body,
            "inbound event"
        );

        let Some(mut user) = self.resolve_user(&event, errors).await else {
            return DispatchOutcome::UserLookupFailed;
        };

        if !gating::is_service_account(&event.sender, self.settings.ignore_users()) {
            self.introduce(&mut user, errors).await;
        }

        let Some(text) = command_text else {
            let body = event.body.trim().to_string();
            return self
                .run_first_match(&[Category::Engine], &body, event, user, errors)
                .await;
        };

        if let Some(request) = help::help_request(&text) {
            self.answer_help(request, &event, &user, errors).await;
            return DispatchOutcome::Help;
        }

        let category = Category::for_command(&text);
        let candidates = if category == Category::Generic {
            vec![Category::Generic]
        } else {
            vec![category, Category::Generic]
        };
        self.run_first_match(&candidates, &text, event, user, errors)
            .await
    }

    async fn resolve_user(&self, event: &ChatEvent, errors: &ErrorSender) -> Option<User> {
        let Some(store) = &self.store else {
            let mut user = User::new(&event.sender.id);
            user.name = event.sender.name.clone();
            return Some(user);
        };

        match get_or_create(store.as_ref(), &event.sender.id, event.sender.name.as_deref()).await {
            Ok(user) => Some(user),
            Err(e) => {
                errors.report(graceless_common::Error::context(
                    format!("resolving user {}", event.sender.id),
                    e,
                ));
                None
            },
        }
    }

    async fn introduce(&self, user: &mut User, errors: &ErrorSender) {
        let (Some(intro), Some(store)) = (&self.intro, &self.store) else {
            return;
        };
        if let Err(e) = intro
            .greet_if_new(
                self.transport.as_ref(),
                store.as_ref(),
                user,
                self.registry.len(),
            )
            .await
        {
            errors.report(graceless_common::Error::context("introduction", e));
        }
    }

    async fn answer_help(
        &self,
        request: HelpRequest<'_>,
        event: &ChatEvent,
        user: &User,
        errors: &ErrorSender,
    ) {
        let text = match request {
            HelpRequest::Listing => {
                help::short_help(&self.registry, &event.sender, user, &self.settings)
            },
            HelpRequest::Topic(topic) => {
                help::long_help(&self.registry, topic, &event.sender, user, &self.settings)
            },
        };
        let Some(text) = text else {
            return;
        };
        if let Err(e) = self.transport.send_message(&event.origin, &text).await {
            errors.report(graceless_common::Error::context("help", e));
        }
    }

    /// Walk `categories` in order and run the first candidate that passes the
    /// gate and matches. A rejected candidate is skipped, not fatal.
    async fn run_first_match(
        &self,
        categories: &[Category],
        text: &str,
        event: ChatEvent,
        user: User,
        errors: &ErrorSender,
    ) -> DispatchOutcome {
        let found = categories
            .iter()
            .flat_map(|&category| self.registry.lookup(category))
            .find_map(|command| {
                if let Err(reason) =
                    pre_check(&command.descriptor, &event.sender, &user, &self.settings)
                {
                    debug!(
                        command = command.descriptor.name(),
                        id = %command.id,
                        %reason,
                        "gate rejected candidate"
                    );
                    return None;
                }
                command
                    .handler
                    .match_command(text)
                    .map(|args| (command, args))
            });

        let Some((command, args)) = found else {
            return DispatchOutcome::NoMatch;
        };
        self.execute(command, args, event, user, errors).await
    }

    async fn execute(
        &self,
        command: RegisteredCommand,
        args: String,
        event: ChatEvent,
        user: User,
        errors: &ErrorSender,
    ) -> DispatchOutcome {
        let name = command.descriptor.name().to_string();
        debug!(command = %name, id = %command.id, sender = %event.sender.id, "executing");

        let ctx = CommandContext {
            args,
            event,
            user,
            transport: Arc::clone(&self.transport),
        };
        match command.handler.execute(ctx).await {
            Ok(()) => DispatchOutcome::Executed {
                command: command.id,
            },
            Err(e) => {
                errors.report(graceless_common::Error::context(format!("command {name}"), e));
                DispatchOutcome::CommandFailed {
                    command: command.id,
                }
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        async_trait::async_trait,
        graceless_channels::ChatUser,
    };

    struct Silent;

    #[async_trait]
    impl Transport for Silent {
        fn id(&self) -> &str {
            "silent"
        }

        async fn send_message(&self, _to: &str, _text: &str) -> graceless_channels::Result<()> {
            Ok(())
        }

        async fn get_user(&self, id: &str) -> graceless_channels::Result<ChatUser> {
            Ok(ChatUser::new(id))
        }

        async fn get_users(&self) -> graceless_channels::Result<Vec<ChatUser>> {
            Ok(Vec::new())
        }

        async fn get_conversation(&self, user_id: &str) -> graceless_channels::Result<String> {
            Ok(format!("D-{user_id}"))
        }

        async fn tunnel_events(
            &self,
            cancel: CancellationToken,
            _events: mpsc::Sender<ChatEvent>,
            _errors: ErrorSender,
        ) {
            cancel.cancelled().await;
        }
    }

    fn config() -> GracelessConfig {
        let mut config = GracelessConfig::default();
        config.engines.sed = false;
        config
    }

    #[test]
    fn build_requires_transport() {
        let err = RouterBuilder::new(config()).build().err().unwrap();
        assert!(matches!(err, Error::MissingTransport));
    }

    #[test]
    fn builtins_depend_on_store() {
        let router = RouterBuilder::new(config())
            .transport(Arc::new(Silent))
            .build()
            .unwrap();
        assert!(router.settings().is_safemode());
        assert_eq!(router.registry().len_of(Category::Add), 0);
        assert_eq!(router.registry().len_of(Category::Generic), 4);

        let router = RouterBuilder::new(config())
            .transport(Arc::new(Silent))
            .store(Arc::new(graceless_users::InMemoryUserStore::new()))
            .build()
            .unwrap();
        assert!(!router.settings().is_safemode());
        assert_eq!(router.registry().len_of(Category::Add), 1);
        assert_eq!(router.registry().len_of(Category::Get), 1);
        assert_eq!(router.registry().len_of(Category::Del), 1);
    }

    #[tokio::test]
    async fn start_returns_once_cancelled() {
        let cancel = CancellationToken::new();
        let router = Arc::new(
            RouterBuilder::new(config())
                .transport(Arc::new(Silent))
                .cancellation(cancel.clone())
                .build()
                .unwrap(),
        );
        let (errors, _rx) = graceless_common::error_channel();
        let handle = tokio::spawn(Arc::clone(&router).start(errors));
        cancel.cancel();
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
