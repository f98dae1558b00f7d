use super::{brand_link, layout, BRAND};

const PROBLEMS: [&str; 3] = [
    "25-54% of K-12 students report low engagement. Fewer than 20% find classwork important or relevant.",
    "Students spend 98+ minutes per day on devices in school, leading to reduced focus and performance.",
    "By 8th grade, students decide if they're \"academic.\" We need to reach them before it's too late.",
];

const SKILLS: [(&str, &str); 6] = [
    ("Problem Solving", "Guided research on real problems to spark curiosity and innovation."),
    ("Literature Review", "Multi-source synthesis, comparison, and analysis skills."),
    ("AI Literacy", "Learn to use AI tools responsibly without sacrificing integrity."),
    ("Source Evaluation", "Fact-checking and credibility assessment from an early age."),
    ("Collaboration", "Group work that mirrors real research environments."),
    ("Research Olympiad", "Engaging triathlon: Solo quiz, team project, and literature review."),
];

const WORKSHOPS: [(&str, &str, [&str; 3]); 2] = [
    (
        "Collaborative Research Labs",
        "Interactive workshops where students work together on real research problems, guided by experienced facilitators.",
        ["60-90 minute focused sessions", "Small groups (8-12 students)", "Real-time feedback and guidance"],
    ),
    (
        "Skill-Building Sessions",
        "Targeted sessions focusing on specific research skills like source evaluation, data analysis, and presentation techniques.",
        ["Grade-level appropriate content", "Progressive skill development", "Certificate of completion"],
    ),
];

fn cards(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join("\n")
}

pub fn render() -> String {
    let problems = cards(PROBLEMS.iter().map(|p| format!("<div class=\"card\"><p>{p}</p></div>")));
    let skills = cards(SKILLS.iter().map(|(name, blurb)| format!("<div class=\"card\"><h3>{name}</h3><p>{blurb}</p></div>")));
    let workshops = cards(WORKSHOPS.iter().map(|(name, blurb, points)| {
        let list: String = points.iter().map(|pt| format!("<li>{pt}</li>")).collect();
        format!("<div class=\"card\"><h3>{name}</h3><p>{blurb}</p><ul>{list}</ul></div>")
    }));

    let body = format!(
        r##"<header>
{brand}
<nav><a href="#features">Features</a> <a href="#workshops">Workshops</a> <a href="#about">About</a> <a href="#contact">Contact</a></nav>
<div><a class="button outline" href="/auth/signin">Sign In</a> <a class="button" href="/auth/signup">Get Started</a></div>
</header>
<main>
<section id="hero">
<h1>Making Research Skills Fun &amp; Accessible</h1>
<p>Research Olympiad teaches K&ndash;8 students critical research skills through engaging competitions, interactive workshops, and structured lessons. Build curiosity, analytical thinking, and collaboration skills that last a lifetime.</p>
<p><a class="button" href="/auth/signup?role=teacher">I'm a Teacher</a> <a class="button outline" href="/auth/signup?role=student">I'm a Student</a></p>
</section>
<section id="about">
<h2>Why 95%+ of Students Avoid Research</h2>
<p>It's not about ability, it's about engagement. Academic identity forms in K-8, and we're here to make it count.</p>
<div class="grid">
{problems}
</div>
</section>
<section id="features">
<h2>Five Core Research Skills</h2>
<p>Building the foundation for lifelong learning and critical thinking</p>
<div class="grid">
{skills}
</div>
</section>
<section id="workshops">
<h2>Interactive Workshops</h2>
<p>Live, hands-on sessions where students practice research skills in real-time with expert guidance and peer collaboration.</p>
<div class="grid">
{workshops}
</div>
</section>
<section id="contact" class="card">
<h2>Ready to Transform Learning?</h2>
<p>Join thousands of educators and students already building research skills through engaging competition.</p>
<p><a class="button" href="/auth/signup?role=teacher">Start Teaching Research</a> <a class="button outline" href="/auth/signup?role=student">Join as Student</a></p>
</section>
</main>
<footer><main><p><strong>{BRAND}</strong>: Making research skills fun and accessible for K-8 students worldwide.</p><p>&copy; 2024 {BRAND}. All rights reserved.</p></main></footer>"##,
        brand = brand_link(),
    );
    layout("Home", &body)
}
