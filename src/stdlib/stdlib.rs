use std::{collections::HashMap, fmt::Debug, rc::Rc};

use tracing::{error, info};

use crate::{
    ast::types::Type,
    parser::parser::parse_native_decl,
    type_checker::scope::{Scope, Variable},
};

use super::{
    function::Function,
    native::{HostType, NativeCallable},
    natives,
};

/// Resolves a dynamic function family to a concrete overload from the
/// argument types of a call, or `None` if the call does not fit.
pub type DynamicResolver = Rc<dyn Fn(&[Type]) -> Option<Function>>;

/// The root of every scope chain: registered natives and dynamic
/// functions. Scripts cannot declare anything here.
#[derive(Default)]
pub struct StandardLibrary {
    natives: HashMap<String, Vec<Rc<Function>>>,
    dynamics: HashMap<String, DynamicResolver>,
}

impl StandardLibrary {
    /// An empty library, without even `print`.
    pub fn empty() -> Self {
        StandardLibrary::default()
    }

    /// The library with every built-in native registered.
    pub fn new() -> Self {
        let mut stdlib = StandardLibrary::empty();
        natives::register_all(&mut stdlib);
        stdlib
    }

    /// Registers `function` under the signature in `declaration`, for
    /// example `"native move(x: number, y: number, z: number);"`.
    ///
    /// The declared types are checked against the Rust signature. Problems
    /// are logged and the native is skipped; the return value tells whether
    /// it was registered.
    pub fn register_native<Args, F>(&mut self, declaration: &str, function: F) -> bool
    where
        F: NativeCallable<Args>,
    {
        let decl = match parse_native_decl(declaration) {
            Ok(decl) => decl,
            Err(err) => {
                error!("Error while parsing native function declaration {:?}: {}", declaration, err);
                return false;
            }
        };

        let name = decl.identifier.clone();
        let parameter_types: Vec<Type> = decl.parameters.iter().map(|p| p.explicit_type.clone()).collect();

        if let Err(message) = check_signature::<Args, F>(&parameter_types, &decl.return_type) {
            error!("Error while type checking native function {}: {}", name, message);
            return false;
        }

        let function = Function::native(
            name.clone(),
            parameter_types,
            decl.parameters.iter().map(|p| p.name.clone()).collect(),
            decl.return_type.clone(),
            function.into_native(),
        );

        let overloads = self.natives.entry(name.clone()).or_default();
        if overloads
            .iter()
            .any(|existing| existing.parameter_types == function.parameter_types)
        {
            error!("Tried to register two identical native functions: {}", function.signature());
            return false;
        }

        info!("Successfully registered native function: {}", function.signature());
        overloads.push(Rc::new(function));
        true
    }

    /// Registers a function family resolved per call site from the argument
    /// types.
    pub fn register_dynamic<F>(&mut self, name: &str, resolver: F) -> bool
    where
        F: Fn(&[Type]) -> Option<Function> + 'static,
    {
        if self.dynamics.contains_key(name) {
            error!("Tried to register two identical dynamic functions: {}", name);
            return false;
        }

        self.dynamics.insert(name.to_string(), Rc::new(resolver));
        info!("Successfully registered dynamic function: {}", name);
        true
    }

    pub fn native_count(&self) -> usize {
        self.natives.values().map(Vec::len).sum()
    }

    pub fn has_dynamic(&self, name: &str) -> bool {
        self.dynamics.contains_key(name)
    }
}

fn check_signature<Args, F: NativeCallable<Args>>(
    parameters: &[Type],
    return_type: &Option<Type>,
) -> Result<(), String> {
    match (return_type, F::return_type()) {
        (None, None) => {}
        (Some(declared), Some(host)) => {
            let declared = HostType::for_type(declared);
            if !host.matches(&declared) {
                return Err(format!("return types do not match, expected {}, found {}", declared, host));
            }
        }
        (Some(declared), None) => {
            return Err(format!("declared to return {} but the function returns nothing", declared));
        }
        (None, Some(host)) => {
            return Err(format!("declared without a return type but the function returns {}", host));
        }
    }

    let host_parameters = F::parameter_types();
    if host_parameters.len() != parameters.len() {
        return Err(format!(
            "parameter counts do not match, declared {}, found {}",
            parameters.len(),
            host_parameters.len()
        ));
    }

    for (index, (declared, host)) in parameters.iter().zip(&host_parameters).enumerate() {
        let declared = HostType::for_type(declared);
        if !host.matches(&declared) {
            return Err(format!(
                "parameter {} has non-matching types, expected {}, found {}",
                index, declared, host
            ));
        }
    }

    Ok(())
}

impl Scope for StandardLibrary {
    fn variable(&self, _name: &str) -> Option<&Variable> {
        None
    }

    fn function(&self, name: &str, arguments: &[Type]) -> Option<Rc<Function>> {
        if let Some(function) = self
            .natives
            .get(name)
            .and_then(|overloads| overloads.iter().find(|f| f.parameter_types == arguments))
        {
            return Some(Rc::clone(function));
        }

        let resolver = self.dynamics.get(name)?;
        resolver(arguments).map(Rc::new)
    }

    fn widened_function(&self, name: &str, arguments: &[Type]) -> Option<Rc<Function>> {
        self.natives
            .get(name)?
            .iter()
            .find(|function| function.accepts_widened(arguments))
            .cloned()
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.natives.keys().chain(self.dynamics.keys()).cloned().collect();
        names.sort();
        names.dedup();
        names
    }
}

impl Debug for StandardLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardLibrary").field("functions", &self.names()).finish()
    }
}
