pub mod error;
pub mod hello;
pub mod interceptor;
pub mod private;
pub mod session;
pub mod todo;

pub use error::RpcError;
pub use hello::{GreetInput, GreetOutput, RandomGreetingOutput};
pub use private::{PRIVATE_MESSAGE, PrivateDataOutput};
pub use session::{CallContext, Session, SessionUser};
pub use todo::{CreateTodoInput, DeleteTodoInput, Todo, TodoMutationOutput, ToggleTodoInput};
