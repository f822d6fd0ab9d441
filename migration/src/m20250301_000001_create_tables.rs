use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 自增主键
fn id(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

/// Unix 秒时间戳，`required` 为 false 时允许为空
fn timestamp(col: impl IntoIden, required: bool) -> ColumnDef {
    let mut def = ColumnDef::new(col);
    def.big_integer();
    if required {
        def.not_null();
    } else {
        def.null();
    }
    def
}

fn owner(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col).big_integer().not_null().to_owned()
}

/// 子表随父行级联删除
fn cascade(
    child: impl IntoTableRef,
    child_col: impl IntoIden,
    parent: impl IntoTableRef,
    parent_col: impl IntoIden,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .from(child, child_col)
        .to(parent, parent_col)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

fn lookup_index(
    name: &str,
    table: impl IntoTableRef,
    col: impl IntoIndexColumn,
) -> IndexCreateStatement {
    Index::create()
        .if_not_exists()
        .name(name)
        .table(table)
        .col(col)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Classes::Table)
                    .if_not_exists()
                    .col(id(Classes::Id))
                    .col(ColumnDef::new(Classes::Name).string().not_null())
                    .col(timestamp(Classes::CreatedAt, true))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(id(Students::Id))
                    .col(owner(Students::ClassId))
                    .col(ColumnDef::new(Students::Name).string().not_null())
                    .col(ColumnDef::new(Students::Email).string().not_null())
                    .col(ColumnDef::new(Students::StudentNo).string().null())
                    .col(timestamp(Students::JoinedAt, true))
                    .foreign_key(&mut cascade(
                        Students::Table,
                        Students::ClassId,
                        Classes::Table,
                        Classes::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Assignments::Table)
                    .if_not_exists()
                    .col(id(Assignments::Id))
                    .col(owner(Assignments::ClassId))
                    .col(ColumnDef::new(Assignments::Title).string().not_null())
                    .col(ColumnDef::new(Assignments::Knowledge).text().null())
                    .col(ColumnDef::new(Assignments::Status).string().not_null())
                    .col(timestamp(Assignments::DueAt, false))
                    .col(timestamp(Assignments::CreatedAt, true))
                    .foreign_key(&mut cascade(
                        Assignments::Table,
                        Assignments::ClassId,
                        Classes::Table,
                        Classes::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // 姓名和邮箱随行冗余保存，批改与统计不必回查学生表
        manager
            .create_table(
                Table::create()
                    .table(Submissions::Table)
                    .if_not_exists()
                    .col(id(Submissions::Id))
                    .col(owner(Submissions::AssignmentId))
                    .col(ColumnDef::new(Submissions::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(Submissions::Name).string().not_null())
                    .col(ColumnDef::new(Submissions::Email).string().not_null())
                    .col(ColumnDef::new(Submissions::Status).string().not_null())
                    .col(ColumnDef::new(Submissions::Score).integer().null())
                    .col(timestamp(Submissions::SubmittedAt, false))
                    .col(ColumnDef::new(Submissions::Feedback).text().null())
                    .col(timestamp(Submissions::UpdatedAt, true))
                    .foreign_key(&mut cascade(
                        Submissions::Table,
                        Submissions::AssignmentId,
                        Assignments::Table,
                        Assignments::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GradingJobs::Table)
                    .if_not_exists()
                    .col(id(GradingJobs::Id))
                    .col(
                        ColumnDef::new(GradingJobs::JobId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(owner(GradingJobs::AssignmentId))
                    .col(ColumnDef::new(GradingJobs::Total).integer().not_null())
                    .col(ColumnDef::new(GradingJobs::Processed).integer().not_null())
                    .col(ColumnDef::new(GradingJobs::Status).string().not_null())
                    .col(ColumnDef::new(GradingJobs::OnlyUngraded).boolean().not_null())
                    .col(timestamp(GradingJobs::CreatedAt, true))
                    .col(timestamp(GradingJobs::CompletedAt, false))
                    .foreign_key(&mut cascade(
                        GradingJobs::Table,
                        GradingJobs::AssignmentId,
                        Assignments::Table,
                        Assignments::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(lookup_index(
                "idx_students_class_id",
                Students::Table,
                Students::ClassId,
            ))
            .await?;
        manager
            .create_index(lookup_index(
                "idx_assignments_class_id",
                Assignments::Table,
                Assignments::ClassId,
            ))
            .await?;
        manager
            .create_index(lookup_index(
                "idx_submissions_assignment_id",
                Submissions::Table,
                Submissions::AssignmentId,
            ))
            .await?;
        manager
            .create_index(lookup_index(
                "idx_grading_jobs_assignment_id",
                GradingJobs::Table,
                GradingJobs::AssignmentId,
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 先删子表
        manager
            .drop_table(Table::drop().table(GradingJobs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Submissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Classes::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Classes {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
    ClassId,
    Name,
    Email,
    StudentNo,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Assignments {
    Table,
    Id,
    ClassId,
    Title,
    Knowledge,
    Status,
    DueAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Submissions {
    Table,
    Id,
    AssignmentId,
    StudentId,
    Name,
    Email,
    Status,
    Score,
    SubmittedAt,
    Feedback,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GradingJobs {
    Table,
    Id,
    JobId,
    AssignmentId,
    Total,
    Processed,
    Status,
    OnlyUngraded,
    CreatedAt,
    CompletedAt,
}
