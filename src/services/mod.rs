//! Service layer
//!
//! 任务依赖的外部协作方（地区解析、搜索引擎推送、接口文档导入）
//! 以及任务日志与用户资料服务。

pub mod geoip;
pub mod job_log;
pub mod seo;
pub mod swagger;
pub mod user_info;

pub use geoip::{RegionLookup, RegionResolver};
pub use job_log::JobLogService;
pub use seo::{BaiduPushNotifier, SeoNotifier};
pub use swagger::{
    ApiDocSource, HttpApiDocSource, ImportSummary, ResourceImporter, SwaggerResourceImporter,
};
pub use user_info::{
    EmailBinding, SubscribeUpdate, UserDisableUpdate, UserInfoDto, UserInfoService,
    UserInfoUpdate, UserRoleUpdate,
};
