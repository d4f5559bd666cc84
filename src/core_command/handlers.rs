use crate::core_command::command::ShareCommand;
use crate::core_error::ShareError;
use crate::core_network::SharedChannel;
use crate::server::ServerContext;
use crate::session::Session;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;

pub type CommandHandler = Box<
    dyn Fn(
            SharedChannel,
            Arc<ServerContext>,
            Arc<TokioMutex<Session>>,
            String, // Command argument, keyword stripped
        ) -> Pin<Box<dyn Future<Output = Result<(), ShareError>> + Send>>
        + Send
        + Sync,
>;

pub type CommandHandlers = HashMap<ShareCommand, Arc<CommandHandler>>;

pub fn initialize_command_handlers() -> CommandHandlers {
    let mut handlers: CommandHandlers = HashMap::new();

    handlers.insert(
        ShareCommand::Auth,
        Arc::new(Box::new(|writer, context, session, arg| {
            Box::pin(crate::core_command::auth::handle_auth_command(
                writer, context, session, arg,
            ))
        })),
    );

    handlers.insert(
        ShareCommand::List,
        Arc::new(Box::new(|writer, context, session, _arg| {
            Box::pin(crate::core_command::list::handle_list_command(
                writer, context, session,
            ))
        })),
    );

    handlers.insert(
        ShareCommand::Get,
        Arc::new(Box::new(|writer, context, session, arg| {
            Box::pin(crate::core_command::get::handle_get_command(
                writer, context, session, arg,
            ))
        })),
    );

    handlers.insert(
        ShareCommand::Put,
        Arc::new(Box::new(|writer, context, session, arg| {
            Box::pin(crate::core_command::put::handle_put_command(
                writer, context, session, arg,
            ))
        })),
    );

    handlers.insert(
        ShareCommand::Quit,
        Arc::new(Box::new(|_writer, _context, session, _arg| {
            Box::pin(crate::core_command::quit::handle_quit_command(session))
        })),
    );

    handlers
}
