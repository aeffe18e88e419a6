pub mod books;
pub mod users;

use inout_kernel::ModuleRegistry;

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry) -> anyhow::Result<()> {
    registry.register(books::create_module());
    registry.register(users::create_module()?);
    Ok(())
}
