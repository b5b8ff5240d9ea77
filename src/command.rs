/*

    The "group selected objects" command.

    Takes no arguments, works on whatever the host has selected
    and either finishes with a proxy or cancels when there is
    nothing to group.

    @date: Nov 2025
    @author: bartu
*/

use crate::bbox::compute_aabb_from;
use crate::error::SceneError;
use crate::group::{GroupHost, GroupProxy, build_group};
use crate::prelude::*;
use crate::settings::GroupSettings;

#[derive(Debug, Clone, PartialEq)]
pub enum CommandStatus {
    Finished(GroupProxy),
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct GroupSelected {
    pub settings: GroupSettings,
}

impl GroupSelected {
    pub const ID: &'static str = "object.max_group";
    pub const LABEL: &'static str = "Max Group";

    pub fn new(settings: GroupSettings) -> Self {
        Self { settings }
    }

    pub fn execute<H: GroupHost>(&self, host: &mut H) -> Result<CommandStatus, SceneError> {
        let span = tracing::span!(tracing::Level::INFO, "group_selected");
        let _enter = span.enter();

        let selection = host.selected_objects();
        if selection.is_empty() {
            warn!("{} cancelled: no objects selected", Self::LABEL);
            return Ok(CommandStatus::Cancelled);
        }
        debug!("Grouping {} selected objects", selection.len());

        let aabb = {
            let views = selection
                .iter()
                .map(|id| host.bounded(*id))
                .collect::<Result<Vec<_>, _>>()?;
            compute_aabb_from(&views, self.settings.bounds_source)
        };
        let Some(aabb) = aabb else {
            return Ok(CommandStatus::Cancelled);
        };

        match build_group(host, &selection, &aabb, &self.settings)? {
            Some(proxy) => Ok(CommandStatus::Finished(proxy)),
            None => Ok(CommandStatus::Cancelled),
        }
    }
}
