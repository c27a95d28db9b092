//! The SNULinks checks

use async_trait::async_trait;

use super::{locators, COPYRIGHT_FRAGMENTS, EXPECTED_TITLE};
use crate::runner::assertions::{assert_contains, assert_equals, assert_true};
use crate::runner::{CheckContext, SmokeCheck};
use crate::Result;

/// Home page title is exactly "SNULinks"
#[derive(Debug, Default)]
pub struct HomePageTitle;

#[async_trait]
impl SmokeCheck for HomePageTitle {
    fn name(&self) -> &str {
        "testHomePageTitle"
    }

    async fn execute(&self, ctx: &mut CheckContext) -> Result<()> {
        ctx.title_is(EXPECTED_TITLE).await?;
        let title = ctx.title().await?;
        assert_equals(title.as_str(), EXPECTED_TITLE, "Home page title mismatch")
    }
}

/// Header login link is displayed
#[derive(Debug, Default)]
pub struct LoginLinkIsPresent;

#[async_trait]
impl SmokeCheck for LoginLinkIsPresent {
    fn name(&self) -> &str {
        "testLoginLinkIsPresent"
    }

    async fn execute(&self, ctx: &mut CheckContext) -> Result<()> {
        let link = ctx.visibility_of_located(&locators::login_link()).await?;
        let displayed = ctx.element(&link).is_displayed().await?;
        assert_true(displayed, "Login link should be displayed")
    }
}

/// "University ERP" link is displayed
#[derive(Debug, Default)]
pub struct UniversityErpLinkIsPresent;

#[async_trait]
impl SmokeCheck for UniversityErpLinkIsPresent {
    fn name(&self) -> &str {
        "testUniversityErpLinkIsPresent"
    }

    async fn execute(&self, ctx: &mut CheckContext) -> Result<()> {
        let link = ctx.visibility_of_located(&locators::university_erp_link()).await?;
        let displayed = ctx.element(&link).is_displayed().await?;
        assert_true(displayed, "University ERP link should be displayed")
    }
}

/// Footer "Academic Research" link is displayed
#[derive(Debug, Default)]
pub struct FooterAcademicResearchLinkIsPresent;

#[async_trait]
impl SmokeCheck for FooterAcademicResearchLinkIsPresent {
    fn name(&self) -> &str {
        "testFooterAcademicResearchLinkIsPresent"
    }

    async fn execute(&self, ctx: &mut CheckContext) -> Result<()> {
        ctx.scroll_to_bottom().await?;
        let link = ctx.visibility_of_located(&locators::academic_research_link()).await?;
        let displayed = ctx.element(&link).is_displayed().await?;
        assert_true(displayed, "Footer 'Academic Research' link should be displayed")
    }
}

/// Footer copyright line names the university, the year and ©
#[derive(Debug, Default)]
pub struct FooterCopyrightText;

#[async_trait]
impl SmokeCheck for FooterCopyrightText {
    fn name(&self) -> &str {
        "testFooterCopyrightText"
    }

    async fn execute(&self, ctx: &mut CheckContext) -> Result<()> {
        ctx.scroll_to_bottom().await?;

        let footer = ctx.presence_of(&locators::copyright_text()).await?;
        ctx.element(&footer).scroll_into_view().await?;
        ctx.visibility_of(&footer).await?;

        let displayed = ctx.element(&footer).is_displayed().await?;
        assert_true(displayed, "Copyright text should be displayed")?;

        let text = ctx.element(&footer).text().await?;
        check_copyright(text.trim())
    }
}

/// Assert every copyright fragment, stopping at the first one missing
pub fn check_copyright(text: &str) -> Result<()> {
    for fragment in COPYRIGHT_FRAGMENTS {
        assert_contains(text, fragment, "Footer copyright text is incomplete")?;
    }
    Ok(())
}
