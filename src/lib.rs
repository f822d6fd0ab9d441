//! Grading Console - 作业批改控制台后端服务
//!
//! 基于 Actix Web 构建的批改任务引擎与班级统计服务。
//!
//! # 架构
//! - `cache`: 缓存层（Moka/Redis），缓存统计快照
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层（批改引擎、统计聚合）
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
