use std::{fmt, hash, ptr, rc::Rc};

use derive_more::{Deref, From};

use crate::{
    errors::Error,
    objects::{CallbackReturn, Value},
};

/// An object owned by the host, such as a shell session or a file.
///
/// Member segments on a handle dispatch by name: `get` answers plain
/// properties, everything else goes to `call_method`.
pub trait HostObject {
    fn type_name(&self) -> &str;

    fn call_method(&self, name: &str, args: Vec<Value>) -> Result<CallbackReturn, Error>;

    fn get(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }
}

pub type Handle = Rc<HandleInner>;

#[derive(From, Deref)]
pub struct HandleInner {
    #[deref]
    pub object: Box<dyn HostObject>,
}

impl HandleInner {
    pub fn new(object: impl HostObject + 'static) -> Self {
        HandleInner {
            object: Box::new(object),
        }
    }
}

impl PartialEq for HandleInner {
    fn eq(&self, other: &Self) -> bool {
        ptr::addr_eq(ptr::from_ref(&*self.object), ptr::from_ref(&*other.object))
    }
}

impl Eq for HandleInner {}

impl hash::Hash for HandleInner {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        ptr::from_ref(&*self.object).cast::<()>().hash(state);
    }
}

impl fmt::Debug for HandleInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {:p}>", self.object.type_name(), ptr::from_ref(&*self.object))
    }
}

impl fmt::Display for HandleInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.object.type_name())
    }
}

impl From<HandleInner> for Value {
    fn from(value: HandleInner) -> Value {
        Value::Handle(Rc::new(value))
    }
}
