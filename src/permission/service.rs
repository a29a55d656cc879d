use crate::permission::model::{AclPermission, Operation, PermissionError, SerialiseObjective};

pub trait DomainPermission {
    fn read_permission(&self) -> AclPermission;

    fn edit_permission(&self) -> AclPermission;

    fn delete_permission(&self) -> AclPermission;

    fn execute_permission(&self) -> AclPermission;

    fn access_permission_for_import_export(
        &self,
        is_export: bool,
        objective: SerialiseObjective,
    ) -> Result<Option<AclPermission>, PermissionError>;

    fn permission_for(&self, operation: Operation) -> AclPermission {
        match operation {
            Operation::Read => self.read_permission(),
            Operation::Edit => self.edit_permission(),
            Operation::Delete => self.delete_permission(),
            Operation::Execute => self.execute_permission(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DatasourcePermission;

impl DomainPermission for DatasourcePermission {
    fn read_permission(&self) -> AclPermission {
        AclPermission::ReadDatasources
    }

    // Deleting a datasource needs the same right as editing it.
    fn edit_permission(&self) -> AclPermission {
        AclPermission::ManageDatasources
    }

    fn delete_permission(&self) -> AclPermission {
        AclPermission::ManageDatasources
    }

    fn execute_permission(&self) -> AclPermission {
        AclPermission::ExecuteDatasources
    }

    fn access_permission_for_import_export(
        &self,
        _is_export: bool,
        objective: SerialiseObjective,
    ) -> Result<Option<AclPermission>, PermissionError> {
        match objective {
            SerialiseObjective::VersionControl => Ok(None),
            SerialiseObjective::Share => Ok(Some(self.edit_permission())),
            SerialiseObjective::KnowledgeBaseGeneration => Err(PermissionError::InvalidParameter(
                "access_permission_for_import_export",
            )),
        }
    }
}
