//! Animation data and drivers.

use tracing::trace;

use super::{BuildError, NodeBuilder};
use crate::graph::{
    ComponentKind, EvalCallback, OperationContext, OperationFlags, OperationKind,
};
use crate::source::{Driver, EntityId, SourceGraph};

impl<'a, S: SourceGraph + ?Sized> NodeBuilder<'a, S> {
    /// Build the animation data hosted by an already-built entity.
    ///
    /// The Animation component only exists if the entity has an action, NLA
    /// tracks or drivers. Each driver becomes one operation.
    pub(super) fn build_animdata(&mut self, owner: EntityId) -> Result<(), BuildError> {
        let source = self.source;
        let anim = match source.lookup(owner)?.anim_data() {
            Some(anim) if anim.is_animated() => anim,
            _ => return Ok(()),
        };
        trace!(entity = %owner, drivers = anim.drivers.len(), "building animation data");

        let component = self
            .entity_mut(owner)
            .get_or_create_component(ComponentKind::Animation);

        for (index, driver) in anim.drivers.iter().enumerate() {
            component.add_operation(
                OperationKind::Exec,
                EvalCallback::Driver,
                driver_name(driver),
                OperationContext::Driver { owner, index },
                driver_flags(driver),
            );
        }
        Ok(())
    }
}

fn driver_name(driver: &Driver) -> String {
    format!("Driver @ {}[{}]", driver.rna_path, driver.array_index)
}

/// Scripted drivers run in the external interpreter and must be serialized
/// against each other.
fn driver_flags(driver: &Driver) -> OperationFlags {
    if driver.uses_scripting() {
        OperationFlags::USES_SCRIPTING
    } else {
        OperationFlags::empty()
    }
}
