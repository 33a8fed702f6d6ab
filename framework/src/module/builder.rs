use super::{Module, Node};
use crate::handler::{HandlerBuilder, HandlerMap};

pub struct ModuleBuilder<T> {
    name: String,
    handlers: HandlerMap<T>,
    children: Vec<Node<T>>,
}

impl<T> ModuleBuilder<T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            handlers: HandlerMap::new(),
            children: Vec::new(),
        }
    }

    pub fn build(self) -> Module<T> {
        Module {
            name: self.name,
            handlers: self.handlers,
            children: self.children,
        }
    }
}

impl<T> HandlerBuilder<T> for ModuleBuilder<T> {
    fn handler_map(&mut self) -> &mut HandlerMap<T> {
        &mut self.handlers
    }

    fn child_nodes(&mut self) -> &mut Vec<Node<T>> {
        &mut self.children
    }
}

impl<T> From<ModuleBuilder<T>> for Node<T> {
    fn from(builder: ModuleBuilder<T>) -> Self {
        builder.build().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::EventContext, events::LOAD, handler_func, Error};

    async fn on_load(_ctx: EventContext<()>) -> Result<(), Error> {
        Ok(())
    }

    #[test]
    fn module_builder_test() {
        let module = ModuleBuilder::<()>::new("parent")
            .on(LOAD, handler_func!(on_load))
            .child(ModuleBuilder::new("first"))
            .child(ModuleBuilder::new("second").build())
            .build();

        assert_eq!(module.name(), "parent");
        assert!(module.handlers().listener(LOAD).is_some());
        assert_eq!(
            module
                .children()
                .iter()
                .map(Node::name)
                .collect::<Vec<_>>(),
            vec!["first", "second"]
        );
    }
}
