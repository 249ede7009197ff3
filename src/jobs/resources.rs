use tracing::{debug, info};

use super::{JobRunner, ResourceImportReport};
use crate::errors::Result;
use crate::storage::RoleResource;

impl JobRunner {
    /// 导入接口资源并授权给管理员角色
    ///
    /// 第一阶段（导入）完成并落库后才开始第二阶段（授权）。
    /// 第二阶段只插入缺失的关联，重复执行不会产生重复行；
    /// 第二阶段失败时重新执行即可补齐。
    pub async fn import_api_resources(&self) -> Result<ResourceImportReport> {
        let summary = self.collaborators.importer.import_resources().await?;

        let role_id = self.settings.admin_role_id;
        let resources = &self.collaborators.resources;
        let resource_ids = resources.list_resource_ids().await?;
        let linked = resources.role_resource_ids(role_id).await?;

        let missing: Vec<RoleResource> = resource_ids
            .into_iter()
            .filter(|id| !linked.contains(id))
            .map(|resource_id| RoleResource {
                role_id,
                resource_id,
            })
            .collect();
        debug!(
            "Role {} has {} resources linked, {} missing",
            role_id,
            linked.len(),
            missing.len()
        );

        let inserted = resources.insert_role_resources(&missing).await?;

        info!(
            "Granted {} new resources to role {} ({} already linked)",
            inserted,
            role_id,
            linked.len()
        );
        Ok(ResourceImportReport {
            imported: summary.imported(),
            created: summary.created,
            updated: summary.updated,
            linked: inserted,
        })
    }
}
