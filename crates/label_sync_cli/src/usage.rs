//! Help text printed when the tool is started without valid arguments.

#[cfg(test)]
#[path = "usage_tests.rs"]
mod tests;

pub const USAGE: &str = r#"This tool will help propagate into the projects of your choice those nice shiny
new global admin labels you worked so hard on. See below.

To get a help message (or use unexpected syntax):
gitlab-fix-labels

General command syntax:
gitlab-fix-labels GITLAB_API_STARTPOINT_URI YOUR_AUTH_TOKEN YOUR_ACTION YOUR_TARGET

Possible actions:

add - add your admin labels to your target project(s); existing labels
will not be touched; any duplicates will be skipped.

delete - completely and utterly delete all of a project's labels.

replace - the same as calling "delete" followed by "add".

Your target:

The target must either be the string "all" (case sensitive, no quotes)
or an integer larger than 0.

Example invocations:
gitlab-fix-labels https://git.mysite.org/api/v4 myspecial_tokenhere add 10
gitlab-fix-labels https://newgitlab.com/api/v5 my2ndspecial_tokenhere delete all
gitlab-fix-labels http://git.lol/api/v4/ myotherspecial_tokenhere replace all
gitlab-fix-labels http://git.lol/api/v5/ special_token2 replace 555

To completely replace the labels on one project with your custom admin global
defaults (set in the administrator area of GitLab):
gitlab-fix-labels GITLAB_API_STARTPOINT_URI YOUR_AUTH_TOKEN replace YOUR_TARGET

To completely replace the labels on ALL projects with your global admin defaults:
gitlab-fix-labels GITLAB_API_STARTPOINT_URI YOUR_AUTH_TOKEN replace all

To append your global admin defaults to ALL projects (not deleting existing labels):
gitlab-fix-labels GITLAB_API_STARTPOINT_URI YOUR_AUTH_TOKEN add all

Note: this tool only handles projects with 100 labels or less.

Set LABEL_SYNC_LOG (e.g. LABEL_SYNC_LOG=info) to change how much is logged."#;
